//! Time abstraction and simulated latency
//!
//! Provider calls suspend for a kind-specific duration to mimic a slow
//! upstream service. The [`Clock`] decides how that suspension happens so
//! tests can skip it entirely.

use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::tier::FetchKind;

/// Time abstraction for testability
pub trait Clock: Send + Sync {
    /// Get the current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Sleep for a duration (async)
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Clock whose sleeps complete immediately
///
/// Every requested sleep is recorded so tests can assert on the latency a
/// provider would have simulated.
#[derive(Debug, Default)]
pub struct InstantClock {
    slept: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }

    /// Sum of all requested sleeps
    pub fn total_slept(&self) -> Duration {
        self.slept.lock().iter().sum()
    }
}

impl Clock for InstantClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

/// Simulated latency per fetch kind, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyProfile {
    pub continents_ms: u64,
    pub countries_ms: u64,
    pub states_ms: u64,
    pub cities_ms: u64,
    pub continent_data_ms: u64,
    pub country_data_ms: u64,
    pub state_data_ms: u64,
    pub city_data_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            continents_ms: 500,
            countries_ms: 800,
            states_ms: 700,
            cities_ms: 600,
            continent_data_ms: 1000,
            country_data_ms: 900,
            state_data_ms: 800,
            city_data_ms: 700,
        }
    }
}

impl LatencyProfile {
    /// No simulated latency at all
    pub fn none() -> Self {
        Self {
            continents_ms: 0,
            countries_ms: 0,
            states_ms: 0,
            cities_ms: 0,
            continent_data_ms: 0,
            country_data_ms: 0,
            state_data_ms: 0,
            city_data_ms: 0,
        }
    }

    /// Every latency multiplied by `factor` (negative factors count as zero)
    pub fn scaled(self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |ms: u64| (ms as f64 * factor).round() as u64;
        Self {
            continents_ms: scale(self.continents_ms),
            countries_ms: scale(self.countries_ms),
            states_ms: scale(self.states_ms),
            cities_ms: scale(self.cities_ms),
            continent_data_ms: scale(self.continent_data_ms),
            country_data_ms: scale(self.country_data_ms),
            state_data_ms: scale(self.state_data_ms),
            city_data_ms: scale(self.city_data_ms),
        }
    }

    pub fn for_kind(&self, kind: FetchKind) -> Duration {
        let ms = match kind {
            FetchKind::Continents => self.continents_ms,
            FetchKind::Countries => self.countries_ms,
            FetchKind::States => self.states_ms,
            FetchKind::Cities => self.cities_ms,
            FetchKind::ContinentData => self.continent_data_ms,
            FetchKind::CountryData => self.country_data_ms,
            FetchKind::StateData => self.state_data_ms,
            FetchKind::CityData => self.city_data_ms,
        };
        Duration::from_millis(ms)
    }
}
