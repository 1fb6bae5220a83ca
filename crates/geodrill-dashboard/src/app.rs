use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use geodrill_core::{
    ActiveTab, DashboardSession, Selection, SelectionEvent, Tier, TierOutcome, derive_active_tab,
    derive_url, render_chart, render_table,
};

use crate::components::*;

/// Shared handle to the dashboard session
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<DashboardSession>,
    pub dismiss_after: Duration,
}

/// Root App component for the dashboard
///
/// The session's selection store and notification center are mirrored into
/// signals; every region (dropdowns, tables, chart, share link) recomputes
/// from those independently.
#[component]
pub fn App() -> Element {
    let AppContext {
        session,
        dismiss_after,
    } = use_context::<AppContext>();

    let mut selection = use_signal(|| session.selection());
    let mut notification = use_signal(|| session.notifications().current());
    let mut shown_tab = use_signal(|| session.active_tab());

    // Mirror selection changes
    use_future({
        let session = session.clone();
        move || {
            let mut rx = session.selection_store().subscribe();
            async move {
                while rx.changed().await.is_ok() {
                    let next = rx.borrow_and_update().clone();
                    selection.set(next);
                }
            }
        }
    });

    // Mirror notification changes
    use_future({
        let session = session.clone();
        move || {
            let mut rx = session.notifications().subscribe();
            async move {
                while rx.changed().await.is_ok() {
                    let next = rx.borrow_and_update().clone();
                    notification.set(next);
                }
            }
        }
    });

    // Auto-dismiss timer, runs for the lifetime of the session
    use_future({
        let session = session.clone();
        move || {
            let center = session.notifications().clone();
            async move {
                if let Err(e) = center.spawn_auto_dismiss(dismiss_after).await {
                    tracing::error!(error = %e, "auto-dismiss timer stopped");
                }
            }
        }
    });

    // A new selection re-derives the displayed tab; tab clicks override it
    use_effect(move || shown_tab.set(derive_active_tab(&selection.read())));

    let continent_options = use_resource({
        let session = session.clone();
        move || {
            let session = session.clone();
            async move { session.continent_options().await }
        }
    });

    let dependent_options = use_resource({
        let session = session.clone();
        move || {
            let session = session.clone();
            let current = selection();
            async move { session.dependent_options(&current).await }
        }
    });

    let tier_outcomes = [
        use_tier_outcome(session.clone(), Tier::Continent, selection),
        use_tier_outcome(session.clone(), Tier::Country, selection),
        use_tier_outcome(session.clone(), Tier::State, selection),
        use_tier_outcome(session.clone(), Tier::City, selection),
    ];

    let current = selection();
    let tab = shown_tab();
    let table = {
        let tier = tab.tier();
        match &*tier_outcomes[tier.depth()].read() {
            Some((fetched_for, outcome)) if *fetched_for == current => {
                render_table(tier, &current, outcome.as_ref())
            }
            _ => render_table(tier, &current, None),
        }
    };
    let chart = render_chart(&current, tab);

    let on_select = {
        let session = session.clone();
        move |(tier, value): (Tier, String)| {
            session.dispatch(SelectionEvent::set(tier, Some(value)));
        }
    };
    let on_dismiss = {
        let session = session.clone();
        move |_: ()| {
            session.notifications().dismiss();
        }
    };

    rsx! {
        div { class: "dashboard",
            Header {}

            SelectorRow {
                selection: current.clone(),
                continents: continent_options.cloned(),
                dependent: dependent_options.cloned(),
                on_select: on_select,
            }

            ShareLink { query: derive_url(&current) }

            div { class: "content",
                TabBar {
                    current_tab: tab,
                    on_select: move |tab: ActiveTab| shown_tab.set(tab),
                }

                div { class: "tab-panel", id: "{tab.as_str()}",
                    TierTable { view: table }
                    ChartPanel { view: chart }
                }
            }

            NotificationToast {
                notification: notification(),
                on_close: on_dismiss,
            }
        }
    }
}

/// Detail outcome of one tier, tagged with the selection it was fetched for
fn use_tier_outcome(
    session: Arc<DashboardSession>,
    tier: Tier,
    selection: Signal<Selection>,
) -> Resource<(Selection, Option<TierOutcome>)> {
    use_resource(move || {
        let session = session.clone();
        let current = selection();
        fetch_tier(session, tier, current)
    })
}

/// Fetch the detail of `tier` on its own task
///
/// A superseded fetch keeps running to completion so its value still lands
/// in the cache.
async fn fetch_tier(
    session: Arc<DashboardSession>,
    tier: Tier,
    selection: Selection,
) -> (Selection, Option<TierOutcome>) {
    let for_selection = selection.clone();
    let task = tokio::spawn(async move { session.tier_outcome(tier, &for_selection).await });
    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(tier = %tier, error = %e, "detail fetch task failed");
            Some(TierOutcome::Failed(e.to_string()))
        }
    };
    (selection, outcome)
}
