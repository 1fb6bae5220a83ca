//! Geographic data provider
//!
//! [`GeoDataProvider`] is the boundary to the (mock) upstream service. The
//! bundled [`MockGeoProvider`] serves a static [`GeoCatalog`], suspends for a
//! per-kind latency and fails according to an injected [`FailurePolicy`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, LatencyProfile, SystemClock};
use crate::error::ProviderError;
use crate::failure::{FailurePolicy, NeverFail};
use crate::tier::{FetchKind, Tier};

/// Continents substituted when the continent list cannot be fetched
pub const DEFAULT_CONTINENTS: [&str; 6] = [
    "North America",
    "Europe",
    "Asia",
    "Africa",
    "South America",
    "Oceania",
];

/// Ordered attribute -> display string mapping for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    entries: Vec<(String, String)>,
}

impl DetailRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// Insert or replace an attribute, keeping its original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A resolved lookup: a list of names or a detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoValue {
    Names(Vec<String>),
    Detail(DetailRecord),
}

impl GeoValue {
    /// Value substituted for a swallowed failure of `kind`
    pub fn fallback(kind: FetchKind) -> Self {
        match kind {
            FetchKind::Continents => {
                GeoValue::Names(DEFAULT_CONTINENTS.iter().map(|c| c.to_string()).collect())
            }
            k if k.is_list() => GeoValue::Names(Vec::new()),
            _ => GeoValue::Detail(DetailRecord::new()),
        }
    }

    /// The names, or an empty list for a detail value
    pub fn into_names(self) -> Vec<String> {
        match self {
            GeoValue::Names(names) => names,
            GeoValue::Detail(_) => Vec::new(),
        }
    }

    /// The record, or an empty record for a list value
    pub fn into_detail(self) -> DetailRecord {
        match self {
            GeoValue::Detail(record) => record,
            GeoValue::Names(_) => DetailRecord::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            GeoValue::Names(names) => names.is_empty(),
            GeoValue::Detail(record) => record.is_empty(),
        }
    }
}

/// Read-only geographic lookups
///
/// Every lookup except [`continents`](Self::continents) takes an optional
/// parent; an absent or unknown parent yields an empty result, not an error.
#[async_trait]
pub trait GeoDataProvider: Send + Sync {
    async fn continents(&self) -> Result<Vec<String>, ProviderError>;

    async fn countries(&self, continent: Option<&str>) -> Result<Vec<String>, ProviderError>;

    async fn states(&self, country: Option<&str>) -> Result<Vec<String>, ProviderError>;

    async fn cities(&self, state: Option<&str>) -> Result<Vec<String>, ProviderError>;

    async fn continent_detail(&self, continent: Option<&str>)
    -> Result<DetailRecord, ProviderError>;

    async fn country_detail(&self, country: Option<&str>) -> Result<DetailRecord, ProviderError>;

    async fn state_detail(&self, state: Option<&str>) -> Result<DetailRecord, ProviderError>;

    async fn city_detail(&self, city: Option<&str>) -> Result<DetailRecord, ProviderError>;

    /// Dispatch a lookup by kind
    async fn fetch(
        &self,
        kind: FetchKind,
        parent: Option<&str>,
    ) -> Result<GeoValue, ProviderError> {
        let value = match kind {
            FetchKind::Continents => GeoValue::Names(self.continents().await?),
            FetchKind::Countries => GeoValue::Names(self.countries(parent).await?),
            FetchKind::States => GeoValue::Names(self.states(parent).await?),
            FetchKind::Cities => GeoValue::Names(self.cities(parent).await?),
            FetchKind::ContinentData => GeoValue::Detail(self.continent_detail(parent).await?),
            FetchKind::CountryData => GeoValue::Detail(self.country_detail(parent).await?),
            FetchKind::StateData => GeoValue::Detail(self.state_detail(parent).await?),
            FetchKind::CityData => GeoValue::Detail(self.city_detail(parent).await?),
        };
        Ok(value)
    }
}

/// Static geographic hierarchy and detail records
#[derive(Debug, Clone, Default)]
pub struct GeoCatalog {
    continents: Vec<String>,
    /// (parent tier, parent name) -> child names
    children: HashMap<(Tier, String), Vec<String>>,
    details: HashMap<(Tier, String), DetailRecord>,
}

impl GeoCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_continents(mut self, names: &[&str]) -> Self {
        self.continents = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Register the children of `parent`, an entity of `tier`
    pub fn with_children(mut self, tier: Tier, parent: &str, names: &[&str]) -> Self {
        self.children.insert(
            (tier, parent.to_string()),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn with_detail(mut self, tier: Tier, name: &str, attrs: &[(&str, &str)]) -> Self {
        self.details.insert(
            (tier, name.to_string()),
            DetailRecord::from_pairs(attrs.iter().copied()),
        );
        self
    }

    pub fn continents(&self) -> Vec<String> {
        self.continents.clone()
    }

    /// Children of `parent` (an entity of `tier`), empty when unknown
    pub fn children_of(&self, tier: Tier, parent: &str) -> Vec<String> {
        self.children
            .get(&(tier, parent.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Detail record for `name` (an entity of `tier`), empty when unknown
    pub fn detail(&self, tier: Tier, name: &str) -> DetailRecord {
        self.details
            .get(&(tier, name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// The built-in mock dataset
    pub fn builtin() -> Self {
        Self::new()
            .with_continents(&DEFAULT_CONTINENTS)
            // Countries
            .with_children(Tier::Continent, "North America", &["USA", "Canada", "Mexico"])
            .with_children(
                Tier::Continent,
                "Europe",
                &["Germany", "France", "UK", "Italy", "Spain"],
            )
            .with_children(Tier::Continent, "Asia", &["China", "Japan", "India", "South Korea"])
            .with_children(
                Tier::Continent,
                "Africa",
                &["South Africa", "Egypt", "Nigeria", "Kenya"],
            )
            .with_children(
                Tier::Continent,
                "South America",
                &["Brazil", "Argentina", "Colombia", "Chile"],
            )
            .with_children(Tier::Continent, "Oceania", &["Australia", "New Zealand"])
            // States / provinces
            .with_children(
                Tier::Country,
                "USA",
                &["California", "New York", "Texas", "Florida"],
            )
            .with_children(
                Tier::Country,
                "Canada",
                &["Ontario", "Quebec", "British Columbia", "Alberta"],
            )
            .with_children(Tier::Country, "Germany", &["Bavaria", "Hesse", "Berlin"])
            .with_children(
                Tier::Country,
                "France",
                &["Île-de-France", "Provence", "Normandy"],
            )
            .with_children(
                Tier::Country,
                "UK",
                &["England", "Scotland", "Wales", "Northern Ireland"],
            )
            // Cities
            .with_children(
                Tier::State,
                "California",
                &["Los Angeles", "San Francisco", "San Diego"],
            )
            .with_children(Tier::State, "New York", &["New York City", "Buffalo", "Albany"])
            .with_children(Tier::State, "Ontario", &["Toronto", "Ottawa", "Hamilton"])
            .with_children(Tier::State, "Bavaria", &["Munich", "Nuremberg", "Augsburg"])
            .with_children(
                Tier::State,
                "Île-de-France",
                &["Paris", "Versailles", "Saint-Denis"],
            )
            .with_children(Tier::State, "England", &["London", "Manchester", "Liverpool"])
            // Continent details
            .with_detail(
                Tier::Continent,
                "North America",
                &[
                    ("Population", "579 million"),
                    ("Area", "24.71 million km²"),
                    ("Countries", "23"),
                    ("Major Languages", "English, Spanish, French"),
                ],
            )
            .with_detail(
                Tier::Continent,
                "Europe",
                &[
                    ("Population", "746 million"),
                    ("Area", "10.18 million km²"),
                    ("Countries", "44"),
                    ("Major Languages", "English, German, French, Italian, Spanish"),
                ],
            )
            .with_detail(
                Tier::Continent,
                "Asia",
                &[
                    ("Population", "4.7 billion"),
                    ("Area", "44.58 million km²"),
                    ("Countries", "48"),
                    ("Major Languages", "Mandarin, Hindi, Arabic, Russian"),
                ],
            )
            // Country details
            .with_detail(
                Tier::Country,
                "USA",
                &[
                    ("Capital", "Washington D.C."),
                    ("Population", "331 million"),
                    ("GDP", "$21.4 trillion"),
                    ("Currency", "USD"),
                    ("Official Language", "English"),
                ],
            )
            .with_detail(
                Tier::Country,
                "Canada",
                &[
                    ("Capital", "Ottawa"),
                    ("Population", "38 million"),
                    ("GDP", "$1.6 trillion"),
                    ("Currency", "CAD"),
                    ("Official Languages", "English, French"),
                ],
            )
            .with_detail(
                Tier::Country,
                "Germany",
                &[
                    ("Capital", "Berlin"),
                    ("Population", "83 million"),
                    ("GDP", "$3.8 trillion"),
                    ("Currency", "Euro"),
                    ("Official Language", "German"),
                ],
            )
            // State details
            .with_detail(
                Tier::State,
                "California",
                &[
                    ("Capital", "Sacramento"),
                    ("Population", "39.5 million"),
                    ("Largest City", "Los Angeles"),
                    ("Area", "423,970 km²"),
                    ("Year Founded", "1850"),
                ],
            )
            .with_detail(
                Tier::State,
                "New York",
                &[
                    ("Capital", "Albany"),
                    ("Population", "19.5 million"),
                    ("Largest City", "New York City"),
                    ("Area", "141,297 km²"),
                    ("Year Founded", "1788"),
                ],
            )
            .with_detail(
                Tier::State,
                "Ontario",
                &[
                    ("Capital", "Toronto"),
                    ("Population", "14.5 million"),
                    ("Largest City", "Toronto"),
                    ("Area", "1,076,395 km²"),
                    ("Year Founded", "1867"),
                ],
            )
            // City details
            .with_detail(
                Tier::City,
                "Los Angeles",
                &[
                    ("Population", "3.9 million"),
                    ("Area", "1,302 km²"),
                    ("Mayor", "Karen Bass"),
                    ("Founded", "1781"),
                    ("Famous For", "Hollywood"),
                ],
            )
            .with_detail(
                Tier::City,
                "New York City",
                &[
                    ("Population", "8.4 million"),
                    ("Area", "783.8 km²"),
                    ("Mayor", "Eric Adams"),
                    ("Founded", "1624"),
                    ("Famous For", "Wall Street"),
                ],
            )
            .with_detail(
                Tier::City,
                "London",
                &[
                    ("Population", "8.9 million"),
                    ("Area", "1,572 km²"),
                    ("Mayor", "Sadiq Khan"),
                    ("Founded", "43 AD"),
                    ("Famous For", "Big Ben"),
                ],
            )
    }
}

/// Mock upstream service over a [`GeoCatalog`]
pub struct MockGeoProvider<C: Clock = SystemClock> {
    catalog: GeoCatalog,
    latency: LatencyProfile,
    clock: Arc<C>,
    failures: Arc<dyn FailurePolicy>,
}

impl MockGeoProvider<SystemClock> {
    /// Built-in catalog, default latencies, real timer, no failures
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl Default for MockGeoProvider<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MockGeoProvider<C> {
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            catalog: GeoCatalog::builtin(),
            latency: LatencyProfile::default(),
            clock,
            failures: Arc::new(NeverFail),
        }
    }

    pub fn with_catalog(mut self, catalog: GeoCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failures(mut self, failures: Arc<dyn FailurePolicy>) -> Self {
        self.failures = failures;
        self
    }

    pub fn catalog(&self) -> &GeoCatalog {
        &self.catalog
    }

    /// Simulated round trip: latency, then a failure roll
    async fn round_trip(&self, kind: FetchKind, parent: Option<&str>) -> Result<(), ProviderError> {
        self.clock.sleep(self.latency.for_kind(kind)).await;
        if self.failures.should_fail(kind) {
            let err = ProviderError::unavailable(kind, parent);
            tracing::warn!(
                kind = %kind,
                parent = ?parent,
                error = %err,
                "simulated provider outage"
            );
            return Err(err);
        }
        Ok(())
    }

    async fn children(
        &self,
        kind: FetchKind,
        parent_tier: Tier,
        parent: Option<&str>,
    ) -> Result<Vec<String>, ProviderError> {
        let Some(parent) = parent.filter(|p| !p.is_empty()) else {
            return Ok(Vec::new());
        };
        self.round_trip(kind, Some(parent)).await?;
        Ok(self.catalog.children_of(parent_tier, parent))
    }

    async fn detail(
        &self,
        kind: FetchKind,
        name: Option<&str>,
    ) -> Result<DetailRecord, ProviderError> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(DetailRecord::new());
        };
        self.round_trip(kind, Some(name)).await?;
        Ok(self.catalog.detail(kind.tier(), name))
    }
}

#[async_trait]
impl<C: Clock + 'static> GeoDataProvider for MockGeoProvider<C> {
    async fn continents(&self) -> Result<Vec<String>, ProviderError> {
        self.round_trip(FetchKind::Continents, None).await?;
        Ok(self.catalog.continents())
    }

    async fn countries(&self, continent: Option<&str>) -> Result<Vec<String>, ProviderError> {
        self.children(FetchKind::Countries, Tier::Continent, continent)
            .await
    }

    async fn states(&self, country: Option<&str>) -> Result<Vec<String>, ProviderError> {
        self.children(FetchKind::States, Tier::Country, country).await
    }

    async fn cities(&self, state: Option<&str>) -> Result<Vec<String>, ProviderError> {
        self.children(FetchKind::Cities, Tier::State, state).await
    }

    async fn continent_detail(
        &self,
        continent: Option<&str>,
    ) -> Result<DetailRecord, ProviderError> {
        self.detail(FetchKind::ContinentData, continent).await
    }

    async fn country_detail(&self, country: Option<&str>) -> Result<DetailRecord, ProviderError> {
        self.detail(FetchKind::CountryData, country).await
    }

    async fn state_detail(&self, state: Option<&str>) -> Result<DetailRecord, ProviderError> {
        self.detail(FetchKind::StateData, state).await
    }

    async fn city_detail(&self, city: Option<&str>) -> Result<DetailRecord, ProviderError> {
        self.detail(FetchKind::CityData, city).await
    }
}

/// Provider decorator that counts invocations per kind
pub struct CountingProvider<P> {
    inner: P,
    calls: [AtomicUsize; 8],
}

impl<P: GeoDataProvider> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Default::default(),
        }
    }

    pub fn calls(&self, kind: FetchKind) -> usize {
        self.calls[slot(kind)].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn record(&self, kind: FetchKind) {
        self.calls[slot(kind)].fetch_add(1, Ordering::SeqCst);
    }
}

fn slot(kind: FetchKind) -> usize {
    match kind {
        FetchKind::Continents => 0,
        FetchKind::Countries => 1,
        FetchKind::States => 2,
        FetchKind::Cities => 3,
        FetchKind::ContinentData => 4,
        FetchKind::CountryData => 5,
        FetchKind::StateData => 6,
        FetchKind::CityData => 7,
    }
}

#[async_trait]
impl<P: GeoDataProvider> GeoDataProvider for CountingProvider<P> {
    async fn continents(&self) -> Result<Vec<String>, ProviderError> {
        self.record(FetchKind::Continents);
        self.inner.continents().await
    }

    async fn countries(&self, continent: Option<&str>) -> Result<Vec<String>, ProviderError> {
        self.record(FetchKind::Countries);
        self.inner.countries(continent).await
    }

    async fn states(&self, country: Option<&str>) -> Result<Vec<String>, ProviderError> {
        self.record(FetchKind::States);
        self.inner.states(country).await
    }

    async fn cities(&self, state: Option<&str>) -> Result<Vec<String>, ProviderError> {
        self.record(FetchKind::Cities);
        self.inner.cities(state).await
    }

    async fn continent_detail(
        &self,
        continent: Option<&str>,
    ) -> Result<DetailRecord, ProviderError> {
        self.record(FetchKind::ContinentData);
        self.inner.continent_detail(continent).await
    }

    async fn country_detail(&self, country: Option<&str>) -> Result<DetailRecord, ProviderError> {
        self.record(FetchKind::CountryData);
        self.inner.country_detail(country).await
    }

    async fn state_detail(&self, state: Option<&str>) -> Result<DetailRecord, ProviderError> {
        self.record(FetchKind::StateData);
        self.inner.state_detail(state).await
    }

    async fn city_detail(&self, city: Option<&str>) -> Result<DetailRecord, ProviderError> {
        self.record(FetchKind::CityData);
        self.inner.city_detail(city).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::InstantClock;
    use crate::failure::{AlwaysFail, FailOnly};
    use std::time::Duration;

    fn instant_provider() -> (Arc<InstantClock>, MockGeoProvider<InstantClock>) {
        let clock = Arc::new(InstantClock::new());
        let provider = MockGeoProvider::with_clock(clock.clone());
        (clock, provider)
    }

    #[test]
    fn test_detail_record_keeps_order() {
        let mut record = DetailRecord::from_pairs([("b", "2"), ("a", "1")]);
        record.insert("b", "3");
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(record.get("b"), Some("3"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_fallback_values() {
        assert_eq!(
            GeoValue::fallback(FetchKind::Continents).into_names().len(),
            DEFAULT_CONTINENTS.len()
        );
        assert!(GeoValue::fallback(FetchKind::Cities).is_empty());
        assert!(matches!(
            GeoValue::fallback(FetchKind::StateData),
            GeoValue::Detail(ref r) if r.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_builtin_lookups() {
        let (_, provider) = instant_provider();
        assert_eq!(provider.continents().await.unwrap().len(), 6);
        assert_eq!(
            provider.countries(Some("Europe")).await.unwrap(),
            vec!["Germany", "France", "UK", "Italy", "Spain"]
        );
        assert_eq!(
            provider.states(Some("UK")).await.unwrap(),
            vec!["England", "Scotland", "Wales", "Northern Ireland"]
        );
        assert_eq!(
            provider.cities(Some("England")).await.unwrap(),
            vec!["London", "Manchester", "Liverpool"]
        );
        let london = provider.city_detail(Some("London")).await.unwrap();
        assert_eq!(london.get("Famous For"), Some("Big Ben"));
    }

    #[tokio::test]
    async fn test_absent_parent_skips_round_trip() {
        let clock = Arc::new(InstantClock::new());
        let provider =
            MockGeoProvider::with_clock(clock.clone()).with_failures(Arc::new(AlwaysFail));
        assert!(provider.countries(None).await.unwrap().is_empty());
        assert!(provider.states(Some("")).await.unwrap().is_empty());
        assert!(provider.city_detail(None).await.unwrap().is_empty());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_parent_is_empty_not_error() {
        let (clock, provider) = instant_provider();
        assert!(provider.states(Some("Mexico")).await.unwrap().is_empty());
        assert!(provider.country_detail(Some("Atlantis")).await.unwrap().is_empty());
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(700), Duration::from_millis(900)]);
    }

    #[tokio::test]
    async fn test_custom_catalog() {
        let catalog = GeoCatalog::new()
            .with_continents(&["Antarctica"])
            .with_children(Tier::Continent, "Antarctica", &["Ross Dependency"])
            .with_detail(Tier::Continent, "Antarctica", &[("Population", "~1,000")]);
        let (_, provider) = instant_provider();
        let provider = provider.with_catalog(catalog);
        assert_eq!(provider.continents().await.unwrap(), vec!["Antarctica"]);
        assert_eq!(provider.countries(Some("Antarctica")).await.unwrap(), vec!["Ross Dependency"]);
        assert!(provider.countries(Some("Europe")).await.unwrap().is_empty());
        let detail = provider.continent_detail(Some("Antarctica")).await.unwrap();
        assert_eq!(detail.get("Population"), Some("~1,000"));
        assert_eq!(provider.catalog().continents().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let (_, provider) = instant_provider();
        let provider = provider.with_failures(Arc::new(FailOnly::new([FetchKind::Cities])));
        let err = provider.cities(Some("Ontario")).await.unwrap_err();
        assert_eq!(err.kind(), FetchKind::Cities);
        assert_eq!(err.parent(), Some("Ontario"));
        assert!(provider.states(Some("Canada")).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_dispatch_and_counting() {
        let (_, provider) = instant_provider();
        let counting = CountingProvider::new(provider);
        let value = counting.fetch(FetchKind::CountryData, Some("Germany")).await.unwrap();
        assert_eq!(value.into_detail().get("Capital"), Some("Berlin"));
        counting.fetch(FetchKind::Countries, Some("Asia")).await.unwrap();
        counting.fetch(FetchKind::Countries, Some("Asia")).await.unwrap();
        assert_eq!(counting.calls(FetchKind::Countries), 2);
        assert_eq!(counting.calls(FetchKind::CountryData), 1);
        assert_eq!(counting.total_calls(), 3);
    }
}
