//! Cascading selection state
//!
//! The whole state machine lives in the [`Selection`] record: changing a tier
//! to a different value clears every deeper tier. [`SelectionStore`] owns the
//! session's selection and publishes each new value to subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::query::{encode_query, parse_query};
use crate::tier::{ActiveTab, Tier};

/// The user's current drill-down position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Set once the selection was hydrated or changed by the user
    pub initialized: bool,
}

/// Discrete inputs to the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    SetContinent(Option<String>),
    SetCountry(Option<String>),
    SetState(Option<String>),
    SetCity(Option<String>),
    /// Initial load from a bookmarked query string
    Hydrate(String),
}

impl SelectionEvent {
    /// Set `tier` to `value`
    pub fn set(tier: Tier, value: Option<String>) -> Self {
        match tier {
            Tier::Continent => SelectionEvent::SetContinent(value),
            Tier::Country => SelectionEvent::SetCountry(value),
            Tier::State => SelectionEvent::SetState(value),
            Tier::City => SelectionEvent::SetCity(value),
        }
    }
}

impl Selection {
    pub fn get(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Continent => self.continent.as_deref(),
            Tier::Country => self.country.as_deref(),
            Tier::State => self.state.as_deref(),
            Tier::City => self.city.as_deref(),
        }
    }

    fn slot(&mut self, tier: Tier) -> &mut Option<String> {
        match tier {
            Tier::Continent => &mut self.continent,
            Tier::Country => &mut self.country,
            Tier::State => &mut self.state,
            Tier::City => &mut self.city,
        }
    }

    /// Whether no tier is chosen
    pub fn is_empty(&self) -> bool {
        Tier::ALL.iter().all(|t| self.get(*t).is_none())
    }

    /// Deepest chosen tier and its value
    pub fn deepest(&self) -> Option<(Tier, &str)> {
        Tier::ALL
            .iter()
            .rev()
            .find_map(|t| self.get(*t).map(|v| (*t, v)))
    }

    /// Apply an event, returning whether the record changed
    pub fn apply(&mut self, event: SelectionEvent) -> bool {
        let before = self.clone();
        match event {
            SelectionEvent::SetContinent(v) => self.set(Tier::Continent, v),
            SelectionEvent::SetCountry(v) => self.set(Tier::Country, v),
            SelectionEvent::SetState(v) => self.set(Tier::State, v),
            SelectionEvent::SetCity(v) => self.set(Tier::City, v),
            SelectionEvent::Hydrate(query) => self.hydrate(&query),
        }
        *self != before
    }

    pub fn set_continent(&mut self, value: Option<String>) {
        self.set(Tier::Continent, value);
    }

    pub fn set_country(&mut self, value: Option<String>) {
        self.set(Tier::Country, value);
    }

    pub fn set_state(&mut self, value: Option<String>) {
        self.set(Tier::State, value);
    }

    pub fn set_city(&mut self, value: Option<String>) {
        self.set(Tier::City, value);
    }

    /// Set a tier, clearing deeper tiers when the value differs
    ///
    /// Empty strings count as "not chosen".
    pub fn set(&mut self, tier: Tier, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        if value.as_deref() != self.get(tier) {
            for deeper in tier.deeper() {
                *self.slot(deeper) = None;
            }
        }
        *self.slot(tier) = value;
        self.initialized = true;
    }

    /// Load tiers from a query string; a no-op once initialized
    pub fn hydrate(&mut self, search: &str) {
        if !self.initialized {
            let params = parse_query(search);
            for tier in Tier::ALL {
                *self.slot(tier) = params.get(tier).map(str::to_string);
            }
        }
        self.initialized = true;
    }
}

/// Query string for the selection, or `None` before initialization
pub fn derive_url(selection: &Selection) -> Option<String> {
    selection.initialized.then(|| encode_query(selection))
}

/// Tab for the deepest chosen tier, continent tab when nothing is chosen
pub fn derive_active_tab(selection: &Selection) -> ActiveTab {
    selection
        .deepest()
        .map(|(tier, _)| tier.tab())
        .unwrap_or_default()
}

/// Session-wide selection with change notification
///
/// Every dispatched event that changes the selection is published on a
/// watch channel. Subscribers recompute independently of each other.
#[derive(Debug)]
pub struct SelectionStore {
    tx: watch::Sender<Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::with_selection(Selection::default())
    }

    pub fn with_selection(selection: Selection) -> Self {
        Self {
            tx: watch::Sender::new(selection),
        }
    }

    /// Apply an event; subscribers are woken only if the selection changed
    pub fn dispatch(&self, event: SelectionEvent) -> bool {
        tracing::debug!(event = ?event, "selection event");
        self.tx.send_if_modified(|selection| selection.apply(event))
    }

    pub fn current(&self) -> Selection {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }

    pub fn active_tab(&self) -> ActiveTab {
        derive_active_tab(&self.tx.borrow())
    }

    pub fn url(&self) -> Option<String> {
        derive_url(&self.tx.borrow())
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sel(
        continent: Option<&str>,
        country: Option<&str>,
        state: Option<&str>,
        city: Option<&str>,
    ) -> Selection {
        Selection {
            continent: continent.map(String::from),
            country: country.map(String::from),
            state: state.map(String::from),
            city: city.map(String::from),
            initialized: true,
        }
    }

    #[test]
    fn test_changing_continent_clears_deeper_tiers() {
        let mut s = sel(Some("Europe"), Some("UK"), Some("England"), Some("London"));
        s.set_continent(Some("Asia".into()));
        assert_eq!(s, sel(Some("Asia"), None, None, None));
    }

    #[test]
    fn test_same_value_keeps_deeper_tiers() {
        let mut s = sel(Some("Europe"), Some("UK"), Some("England"), Some("London"));
        assert!(!s.apply(SelectionEvent::SetCountry(Some("UK".into()))));
        assert_eq!(s.city.as_deref(), Some("London"));
    }

    #[test]
    fn test_state_clears_city_and_city_clears_nothing() {
        let mut s = sel(Some("Europe"), Some("UK"), Some("England"), Some("London"));
        s.set_state(Some("Wales".into()));
        assert_eq!(s, sel(Some("Europe"), Some("UK"), Some("Wales"), None));
        s.set_city(Some("Cardiff".into()));
        assert_eq!(s, sel(Some("Europe"), Some("UK"), Some("Wales"), Some("Cardiff")));
    }

    #[test]
    fn test_clearing_a_tier_cascades() {
        let mut s = sel(Some("Europe"), Some("UK"), Some("England"), None);
        s.set_country(None);
        assert_eq!(s, sel(Some("Europe"), None, None, None));
        s.set_continent(Some(String::new()));
        assert!(s.is_empty());
    }

    #[test]
    fn test_any_change_clears_deeper_tiers() {
        let names = ["A", "B", "C"];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let mut s = Selection::default();
            for _ in 0..12 {
                let tier = Tier::ALL[rng.random_range(0..4)];
                let value = if rng.random_bool(0.2) {
                    None
                } else {
                    Some(names[rng.random_range(0..names.len())].to_string())
                };
                let differs = value.as_deref() != s.get(tier);
                s.set(tier, value.clone());
                assert_eq!(s.get(tier), value.as_deref());
                if differs {
                    assert!(tier.deeper().all(|d| s.get(d).is_none()));
                }
            }
        }
    }

    #[test]
    fn test_setters_mark_initialized() {
        let mut s = Selection::default();
        s.set_city(Some("London".into()));
        assert!(s.initialized);
    }

    #[test]
    fn test_hydrate_only_once() {
        let mut s = Selection::default();
        assert!(s.apply(SelectionEvent::Hydrate("?continent=Europe&city=London".into())));
        assert_eq!(s, sel(Some("Europe"), None, None, Some("London")));

        assert!(!s.apply(SelectionEvent::Hydrate("?continent=Asia".into())));
        assert_eq!(s.continent.as_deref(), Some("Europe"));
    }

    #[test]
    fn test_hydrate_empty_query_initializes() {
        let mut s = Selection::default();
        s.hydrate("");
        assert!(s.initialized);
        assert!(s.is_empty());
    }

    #[test]
    fn test_hydrate_after_user_change_is_ignored() {
        let mut s = Selection::default();
        s.set_continent(Some("Africa".into()));
        s.hydrate("?continent=Europe");
        assert_eq!(s.continent.as_deref(), Some("Africa"));
    }

    #[test]
    fn test_derive_url() {
        assert_eq!(derive_url(&Selection::default()), None);

        let mut s = Selection::default();
        s.hydrate("?continent=Europe&city=London");
        assert_eq!(derive_url(&s).as_deref(), Some("?continent=Europe&city=London"));

        s.set_continent(None);
        assert_eq!(derive_url(&s).as_deref(), Some(""));
    }

    #[test]
    fn test_derive_active_tab_precedence() {
        assert_eq!(derive_active_tab(&Selection::default()), ActiveTab::Continent);
        assert_eq!(
            derive_active_tab(&sel(Some("Asia"), None, Some("Bavaria"), None)),
            ActiveTab::State
        );
        assert_eq!(derive_active_tab(&sel(None, Some("UK"), None, None)), ActiveTab::Country);
        assert_eq!(
            derive_active_tab(&sel(Some("Europe"), Some("UK"), Some("England"), Some("London"))),
            ActiveTab::City
        );
    }

    #[tokio::test]
    async fn test_store_notifies_subscribers_on_change_only() {
        let store = SelectionStore::new();
        let mut rx = store.subscribe();

        assert!(store.dispatch(SelectionEvent::SetContinent(Some("Europe".into()))));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().continent.as_deref(), Some("Europe"));

        assert!(!store.dispatch(SelectionEvent::SetContinent(Some("Europe".into()))));
        assert!(!rx.has_changed().unwrap());

        store.dispatch(SelectionEvent::SetCountry(Some("UK".into())));
        rx.changed().await.unwrap();
        assert_eq!(store.active_tab(), ActiveTab::Country);
        assert_eq!(store.url().as_deref(), Some("?continent=Europe&country=UK"));
    }
}
