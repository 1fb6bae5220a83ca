//! Dashboard configuration

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_RETHROW_RATE};
use crate::clock::LatencyProfile;
use crate::error::ConfigError;
use crate::failure::{FailurePolicy, RandomFailure, SeededFailure};

/// Default probability that a provider call fails
pub const DEFAULT_PROVIDER_FAILURE_RATE: f64 = 0.05;

/// Runtime knobs for a dashboard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Maximum number of memoized lookups
    pub cache_capacity: usize,
    /// Probability that a provider call fails
    pub provider_failure_rate: f64,
    /// Probability that the cache re-raises a provider failure
    pub cache_rethrow_rate: f64,
    /// Whether provider calls suspend for their latency
    pub simulate_latency: bool,
    pub latency: LatencyProfile,
    /// Auto-dismiss period for notifications
    pub dismiss_after_secs: u64,
    /// Seed for reproducible failure injection
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            provider_failure_rate: DEFAULT_PROVIDER_FAILURE_RATE,
            cache_rethrow_rate: DEFAULT_RETHROW_RATE,
            simulate_latency: true,
            latency: LatencyProfile::default(),
            dismiss_after_secs: 8,
            seed: None,
        }
    }
}

impl DashboardConfig {
    /// No latency and no injected failures
    pub fn testing() -> Self {
        Self {
            provider_failure_rate: 0.0,
            cache_rethrow_rate: 0.0,
            simulate_latency: false,
            ..Default::default()
        }
    }

    /// Load and validate a JSON config file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be at least 1".into()));
        }
        for (name, rate) in [
            ("provider_failure_rate", self.provider_failure_rate),
            ("cache_rethrow_rate", self.cache_rethrow_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.dismiss_after_secs == 0 {
            return Err(ConfigError::Invalid("dismiss_after_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_latency(mut self, enabled: bool) -> Self {
        self.simulate_latency = enabled;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_failure_rates(mut self, provider: f64, rethrow: f64) -> Self {
        self.provider_failure_rate = provider;
        self.cache_rethrow_rate = rethrow;
        self
    }

    /// Latency the provider should simulate
    pub fn effective_latency(&self) -> LatencyProfile {
        if self.simulate_latency {
            self.latency
        } else {
            LatencyProfile::none()
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_secs(self.dismiss_after_secs)
    }

    /// Failure policy for provider calls
    pub fn provider_policy(&self) -> Arc<dyn FailurePolicy> {
        policy(self.provider_failure_rate, self.seed)
    }

    /// Failure policy for the cache's re-raise check
    pub fn rethrow_policy(&self) -> Arc<dyn FailurePolicy> {
        // Offset the seed so both checks draw independent sequences.
        policy(self.cache_rethrow_rate, self.seed.map(|s| s.wrapping_add(1)))
    }
}

fn policy(rate: f64, seed: Option<u64>) -> Arc<dyn FailurePolicy> {
    match seed {
        Some(seed) => Arc::new(SeededFailure::new(rate, seed)),
        None => Arc::new(RandomFailure::new(rate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::FetchKind;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.cache_capacity, 128);
        assert_eq!(config.provider_failure_rate, 0.05);
        assert_eq!(config.cache_rethrow_rate, 0.10);
        assert_eq!(config.dismiss_after(), Duration::from_secs(8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config_is_quiet() {
        let config = DashboardConfig::testing();
        assert_eq!(config.effective_latency(), LatencyProfile::none());
        let policy = config.provider_policy();
        assert!((0..50).all(|_| !policy.should_fail(FetchKind::Cities)));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let raw = r#"{"cache_capacity": 16, "latency": {"cities_ms": 5}}"#;
        let config = DashboardConfig::from_json_str(raw).unwrap();
        assert_eq!(config.cache_capacity, 16);
        assert_eq!(config.latency.cities_ms, 5);
        assert_eq!(config.latency.continents_ms, 500);
        assert_eq!(config.dismiss_after_secs, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"cache_rethrow_rate": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(DashboardConfig::default().with_cache_capacity(0).validate().is_err());
        assert!(matches!(DashboardConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 9, "simulate_latency": false}}"#).unwrap();
        let config = DashboardConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(9));
        assert!(!config.simulate_latency);

        assert!(matches!(
            DashboardConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_seeded_policies_reproducible() {
        let config = DashboardConfig::default().with_seed(3).with_failure_rates(0.5, 0.5);
        let a = config.provider_policy();
        let b = config.provider_policy();
        let seq_a: Vec<_> = (0..32).map(|_| a.should_fail(FetchKind::States)).collect();
        let seq_b: Vec<_> = (0..32).map(|_| b.should_fail(FetchKind::States)).collect();
        assert_eq!(seq_a, seq_b);
    }
}
