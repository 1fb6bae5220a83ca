//! Error types for geodrill

use thiserror::Error;

use crate::tier::FetchKind;

/// Top-level error type for geodrill
#[derive(Debug, Error)]
pub enum GeodrillError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures raised by a data provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Simulated transient upstream outage
    #[error("{reason}")]
    Unavailable {
        kind: FetchKind,
        parent: Option<String>,
        reason: String,
    },
}

impl ProviderError {
    /// Outage for `kind`, worded the way the upstream service reports it
    pub fn unavailable(kind: FetchKind, parent: Option<&str>) -> Self {
        let p = parent.unwrap_or_default();
        let reason = match kind {
            FetchKind::Continents => "Network error while fetching continents data".to_string(),
            FetchKind::Countries => format!("Database error while fetching countries for {p}"),
            FetchKind::States => format!("API timeout while fetching states for {p}"),
            FetchKind::Cities => format!("Server error while fetching cities for {p}"),
            FetchKind::ContinentData => format!("Data service unavailable for {p} information"),
            FetchKind::CountryData => {
                format!("Authentication error while fetching data for {p}")
            }
            FetchKind::StateData => format!("Connection error while fetching data for {p}"),
            FetchKind::CityData => format!("Rate limit exceeded while fetching data for {p}"),
        };
        ProviderError::Unavailable {
            kind,
            parent: parent.map(str::to_string),
            reason,
        }
    }

    pub fn kind(&self) -> FetchKind {
        match self {
            ProviderError::Unavailable { kind, .. } => *kind,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match self {
            ProviderError::Unavailable { parent, .. } => parent.as_deref(),
        }
    }
}

/// Failures surfaced by the cache layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// A provider failure the secondary check chose to re-raise
    #[error("Error fetching {kind} data: {cause}")]
    FetchFailed {
        kind: FetchKind,
        #[source]
        cause: ProviderError,
    },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for geodrill operations
pub type GeodrillResult<T> = Result<T, GeodrillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::unavailable(FetchKind::Continents, None);
        assert_eq!(err.to_string(), "Network error while fetching continents data");
        assert_eq!(err.parent(), None);

        let err = ProviderError::unavailable(FetchKind::Cities, Some("Ontario"));
        assert_eq!(err.to_string(), "Server error while fetching cities for Ontario");
        assert_eq!(err.kind(), FetchKind::Cities);
        assert_eq!(err.parent(), Some("Ontario"));

        let err = ProviderError::unavailable(FetchKind::CityData, Some("London"));
        assert!(err.to_string().contains("Rate limit exceeded"));
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::FetchFailed {
            kind: FetchKind::States,
            cause: ProviderError::unavailable(FetchKind::States, Some("UK")),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Error fetching states data:"));
        assert!(msg.contains("API timeout while fetching states for UK"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_conversions() {
        let err: GeodrillError =
            ProviderError::unavailable(FetchKind::Countries, Some("Asia")).into();
        assert!(matches!(err, GeodrillError::Provider(_)));

        let err: GeodrillError = ConfigError::Invalid("capacity".to_string()).into();
        assert!(matches!(err, GeodrillError::Config(_)));
        assert!(err.to_string().contains("capacity"));
    }
}
