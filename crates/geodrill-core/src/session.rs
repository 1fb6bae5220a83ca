//! Per-session composition of cache, selection and notifications
//!
//! Each operation is a UI-triggering fetch boundary: failures are turned
//! into a notification plus a placeholder, never propagated.

use std::sync::Arc;

use crate::cache::GeoCache;
use crate::config::DashboardConfig;
use crate::notify::NotificationCenter;
use crate::provider::{GeoDataProvider, MockGeoProvider};
use crate::selection::{Selection, SelectionEvent, SelectionStore, derive_active_tab};
use crate::tier::{ActiveTab, FetchKind, Tier};
use crate::view::{ChartView, DropdownOption, TableView, TierOutcome, render_chart, render_table};

/// Option lists for the three dependent dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentOptions {
    pub countries: Vec<DropdownOption>,
    pub states: Vec<DropdownOption>,
    pub cities: Vec<DropdownOption>,
}

impl DependentOptions {
    pub fn for_tier(&self, tier: Tier) -> &[DropdownOption] {
        match tier {
            Tier::Continent => &[],
            Tier::Country => &self.countries,
            Tier::State => &self.states,
            Tier::City => &self.cities,
        }
    }
}

pub struct DashboardSession {
    cache: GeoCache,
    selection: SelectionStore,
    notifications: Arc<NotificationCenter>,
}

impl DashboardSession {
    pub fn new(cache: GeoCache) -> Self {
        Self {
            cache,
            selection: SelectionStore::new(),
            notifications: Arc::new(NotificationCenter::new()),
        }
    }

    /// Session over the built-in mock provider
    pub fn from_config(config: &DashboardConfig) -> Self {
        let provider = MockGeoProvider::new()
            .with_latency(config.effective_latency())
            .with_failures(config.provider_policy());
        Self::with_provider(Arc::new(provider), config)
    }

    /// Session over an arbitrary provider, cache tuned by `config`
    pub fn with_provider(provider: Arc<dyn GeoDataProvider>, config: &DashboardConfig) -> Self {
        let cache = GeoCache::new(provider)
            .with_capacity(config.cache_capacity)
            .with_rethrow_policy(config.rethrow_policy());
        Self::new(cache)
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    pub fn selection_store(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    pub fn dispatch(&self, event: SelectionEvent) -> bool {
        self.selection.dispatch(event)
    }

    pub fn selection(&self) -> Selection {
        self.selection.current()
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.selection.active_tab()
    }

    /// Query string to publish, `None` before initialization
    pub fn query_string(&self) -> Option<String> {
        self.selection.url()
    }

    /// Options for the continent dropdown
    pub async fn continent_options(&self) -> Vec<DropdownOption> {
        match self.cache.names(FetchKind::Continents, None).await {
            Ok(names) => DropdownOption::from_names(&names),
            Err(e) => {
                self.notifications
                    .raise_error(format!("Error loading continents: {e}"));
                Vec::new()
            }
        }
    }

    /// Options for the country, state and city dropdowns
    ///
    /// A list is only fetched when its parent is chosen. Any failure empties
    /// all three lists.
    pub async fn dependent_options(&self, selection: &Selection) -> DependentOptions {
        match self.try_dependent_options(selection).await {
            Ok(options) => options,
            Err(e) => {
                self.notifications
                    .raise_error(format!("Error loading dropdown options: {e}"));
                DependentOptions::default()
            }
        }
    }

    async fn try_dependent_options(
        &self,
        selection: &Selection,
    ) -> Result<DependentOptions, crate::error::CacheError> {
        let mut options = DependentOptions::default();
        let levels = [
            (Tier::Continent, Tier::Country),
            (Tier::Country, Tier::State),
            (Tier::State, Tier::City),
        ];
        for (parent_tier, tier) in levels {
            let Some(parent) = selection.get(parent_tier) else {
                continue;
            };
            let names = self.cache.names(FetchKind::list_for(tier), Some(parent)).await?;
            let list = DropdownOption::from_names(&names);
            match tier {
                Tier::Country => options.countries = list,
                Tier::State => options.states = list,
                _ => options.cities = list,
            }
        }
        Ok(options)
    }

    /// Fetch the detail record for the selected entity of `tier`
    ///
    /// `None` when nothing is selected at that tier.
    pub async fn tier_outcome(&self, tier: Tier, selection: &Selection) -> Option<TierOutcome> {
        let name = selection.get(tier)?;
        let outcome = match self.cache.detail(FetchKind::detail_for(tier), Some(name)).await {
            Ok(record) => TierOutcome::Loaded(record),
            Err(e) => {
                self.notifications
                    .raise_error(format!("Error loading {} data: {e}", tier.key()));
                TierOutcome::Failed(e.to_string())
            }
        };
        Some(outcome)
    }

    /// Fetch and render the detail panel of `tier`
    pub async fn tier_table(&self, tier: Tier, selection: &Selection) -> TableView {
        let outcome = self.tier_outcome(tier, selection).await;
        render_table(tier, selection, outcome.as_ref())
    }

    /// Chart for the selection's derived active tab
    pub fn chart(&self, selection: &Selection) -> ChartView {
        render_chart(selection, derive_active_tab(selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::InstantClock;
    use crate::failure::{AlwaysFail, FailOnly, FailurePolicy, NeverFail};
    use crate::notify::NotificationKind;

    fn session_with(
        provider_failures: Arc<dyn FailurePolicy>,
        rethrow: Arc<dyn FailurePolicy>,
    ) -> DashboardSession {
        let provider = MockGeoProvider::with_clock(Arc::new(InstantClock::new()))
            .with_failures(provider_failures);
        DashboardSession::new(GeoCache::new(Arc::new(provider)).with_rethrow_policy(rethrow))
    }

    #[tokio::test]
    async fn test_dependent_options_follow_selection() {
        let session = session_with(Arc::new(NeverFail), Arc::new(NeverFail));
        session.dispatch(SelectionEvent::SetContinent(Some("North America".into())));
        session.dispatch(SelectionEvent::SetCountry(Some("Canada".into())));

        let options = session.dependent_options(&session.selection()).await;
        assert_eq!(options.countries.len(), 3);
        assert_eq!(options.states[0].value, "Ontario");
        assert!(options.cities.is_empty());
        assert!(options.for_tier(Tier::Continent).is_empty());
    }

    #[tokio::test]
    async fn test_dropdown_failure_empties_all_and_notifies() {
        let failures = FailOnly::new([FetchKind::States]);
        let session = session_with(Arc::new(failures), Arc::new(AlwaysFail));
        session.dispatch(SelectionEvent::Hydrate("?continent=Europe&country=UK".into()));

        let options = session.dependent_options(&session.selection()).await;
        assert_eq!(options, DependentOptions::default());

        let note = session.notifications().current();
        assert!(note.show);
        assert_eq!(note.kind, NotificationKind::Error);
        assert!(
            note.message
                .starts_with("Error loading dropdown options: Error fetching states data:")
        );
    }

    #[tokio::test]
    async fn test_continent_failure_notifies() {
        let session = session_with(Arc::new(AlwaysFail), Arc::new(AlwaysFail));
        assert!(session.continent_options().await.is_empty());
        assert!(session.notifications().current().message.starts_with("Error loading continents:"));
    }

    #[tokio::test]
    async fn test_table_error_placeholder() {
        let failures = FailOnly::new([FetchKind::CountryData]);
        let session = session_with(Arc::new(failures), Arc::new(AlwaysFail));
        session.dispatch(SelectionEvent::Hydrate("?country=USA".into()));

        let view = session.tier_table(Tier::Country, &session.selection()).await;
        assert_eq!(
            view,
            TableView::Error {
                message: "Error loading data for USA.".to_string()
            }
        );
        let note = session.notifications().current();
        assert!(note.message.starts_with("Error loading country data:"));

        // Nothing selected at the city tier: no fetch, no outcome
        assert!(session.tier_outcome(Tier::City, &session.selection()).await.is_none());
    }

    #[tokio::test]
    async fn test_inconsistent_url_yields_empty_options() {
        let session = session_with(Arc::new(NeverFail), Arc::new(NeverFail));
        session.dispatch(SelectionEvent::Hydrate("?country=Germany".into()));

        let options = session.dependent_options(&session.selection()).await;
        assert!(options.countries.is_empty());
        assert_eq!(options.states.len(), 3);
        assert!(!session.notifications().is_showing());
    }

    #[test]
    fn test_from_config_builds_session() {
        let config = DashboardConfig::testing().with_cache_capacity(4);
        let session = DashboardSession::from_config(&config);
        assert_eq!(session.cache().capacity(), 4);
        assert_eq!(session.query_string(), None);
        assert_eq!(session.active_tab(), ActiveTab::Continent);
    }
}
