use dioxus::prelude::*;
use geodrill_core::{
    ActiveTab, ChartView, DependentOptions, DetailTable, DropdownOption, ErrorNotification,
    Selection, TableView, Tier,
};

pub mod charts;

pub use charts::ClimateScatter;

/// Header component with dashboard title
#[component]
pub fn Header() -> Element {
    rsx! {
        div {
            class: "header",
            h1 { "Geographic Data Dashboard" }
            p { class: "subtitle", "Drill down from continents to cities" }
        }
    }
}

/// The four cascading dropdowns
///
/// `None` option lists are still loading. A dropdown is disabled until its
/// parent tier has a value.
#[component]
pub fn SelectorRow(
    selection: Selection,
    continents: Option<Vec<DropdownOption>>,
    dependent: Option<DependentOptions>,
    on_select: EventHandler<(Tier, String)>,
) -> Element {
    rsx! {
        div {
            class: "selector-row",
            for tier in Tier::ALL {
                {
                    let options = match tier {
                        Tier::Continent => continents.clone(),
                        _ => dependent.as_ref().map(|d| d.for_tier(tier).to_vec()),
                    };
                    let enabled = match tier {
                        Tier::Continent => true,
                        Tier::Country => selection.get(Tier::Continent).is_some(),
                        Tier::State => selection.get(Tier::Country).is_some(),
                        Tier::City => selection.get(Tier::State).is_some(),
                    };
                    rsx! {
                        TierSelector {
                            key: "{tier.key()}",
                            tier,
                            options,
                            value: selection.get(tier).map(str::to_string),
                            enabled,
                            on_change: move |value: String| on_select.call((tier, value)),
                        }
                    }
                }
            }
        }
    }
}

/// One labeled dropdown
#[component]
pub fn TierSelector(
    tier: Tier,
    options: Option<Vec<DropdownOption>>,
    value: Option<String>,
    enabled: bool,
    on_change: EventHandler<String>,
) -> Element {
    let loading = options.is_none();
    let options = options.unwrap_or_default();
    let placeholder = if loading {
        "Loading...".to_string()
    } else {
        format!("Select {}", tier.label())
    };

    rsx! {
        div {
            class: "selector",
            label { r#for: "{tier.key()}-dropdown", "{tier.label()}" }
            select {
                id: "{tier.key()}-dropdown",
                disabled: !enabled || loading,
                onchange: move |evt: FormEvent| on_change.call(evt.value()),
                option {
                    value: "",
                    selected: value.is_none(),
                    "{placeholder}"
                }
                for opt in options {
                    option {
                        key: "{opt.value}",
                        value: "{opt.value}",
                        selected: value.as_deref() == Some(opt.value.as_str()),
                        "{opt.label}"
                    }
                }
            }
        }
    }
}

/// Shareable query string for the current selection
#[component]
pub fn ShareLink(query: Option<String>) -> Element {
    let text = match query.as_deref() {
        None | Some("") => "No selection yet".to_string(),
        Some(q) => q.to_string(),
    };

    rsx! {
        div {
            class: "share-link",
            span { class: "share-label", "Share link" }
            code { "{text}" }
        }
    }
}

/// Tab bar with one tab per tier
#[component]
pub fn TabBar(current_tab: ActiveTab, on_select: EventHandler<ActiveTab>) -> Element {
    rsx! {
        div { class: "tab-bar",
            for tier in Tier::ALL {
                button {
                    key: "{tier.key()}",
                    class: if current_tab == tier.tab() { "tab-btn active" } else { "tab-btn" },
                    onclick: move |_| on_select.call(tier.tab()),
                    "{tier.label()}"
                }
            }
        }
    }
}

/// Detail table (or placeholder) for the displayed tier
#[component]
pub fn TierTable(view: TableView) -> Element {
    match view {
        TableView::Empty { prompt } => rsx! {
            p { class: "placeholder", "{prompt}" }
        },
        TableView::Loading { message } => rsx! {
            div { class: "placeholder loading",
                span { class: "spinner" }
                "{message}"
            }
        },
        TableView::NoData { message } => rsx! {
            p { class: "placeholder", "{message}" }
        },
        TableView::Error { message } => rsx! {
            p { class: "placeholder error", "{message}" }
        },
        TableView::Detail(detail) => rsx! {
            div { class: "detail-card",
                h3 { "{detail.title}" }
                table { id: "{detail.grid_id}", class: "detail-grid",
                    thead {
                        tr {
                            for column in detail.columns.iter().map(|c| DetailTable::header(c)) {
                                th { key: "{column}", "{column}" }
                            }
                        }
                    }
                    tbody {
                        tr {
                            for (i, value) in detail.row.iter().enumerate() {
                                td { key: "{i}", "{value}" }
                            }
                        }
                    }
                }
            }
        },
    }
}

/// Climate chart for the displayed tier
#[component]
pub fn ChartPanel(view: ChartView) -> Element {
    match view {
        ChartView::Empty { prompt } => rsx! {
            p { class: "placeholder", "{prompt}" }
        },
        ChartView::Climate(chart) => rsx! {
            div { class: "chart-card",
                h3 { "{chart.heading}" }
                ClimateScatter { chart }
            }
        },
    }
}

/// Error toast with close button
#[component]
pub fn NotificationToast(notification: ErrorNotification, on_close: EventHandler<()>) -> Element {
    if !notification.show {
        return rsx! {};
    }

    rsx! {
        div {
            class: "toast toast-{notification.kind.as_str()}",
            role: "alert",
            span { class: "toast-icon", "{notification.kind.icon()}" }
            div {
                class: "toast-body",
                strong { "{notification.kind.label()}" }
                p { "{notification.message}" }
            }
            button {
                class: "toast-close",
                onclick: move |_| on_close.call(()),
                "×"
            }
        }
    }
}
