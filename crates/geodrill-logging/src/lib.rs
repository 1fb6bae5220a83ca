//! Structured logging for the geodrill dashboard
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines to the console by default
//! - **Pretty Output**: Human-readable console output for development
//! - **Session Context**: Tag spans with the dashboard session they belong to
//! - **Session Log**: Optional JSONL file per session (or rolling daily/hourly)
//!
//! # Quick Start
//!
//! ```ignore
//! use geodrill_logging::{ConsoleFormat, GeodrillSubscriberBuilder, SessionLog};
//!
//! // JSONL to console
//! let _guard = GeodrillSubscriberBuilder::new().init();
//!
//! // Pretty console plus a JSONL file for this session
//! let _guard = GeodrillSubscriberBuilder::new()
//!     .with_console(ConsoleFormat::Pretty)
//!     .with_session_log(SessionLog::for_session("./logs", session_id))
//!     .init();
//! ```

pub mod config;
pub mod context;
pub mod layers;

pub use config::{ConsoleFormat, JsonlConfig, LogConfig, LogRotation, SessionLog};
pub use context::{SessionContextData, SessionContextGuard};
pub use layers::{SessionContextLayer, jsonl_layer};

use std::fs::{self, File};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to prepare session log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install global subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Builder for configuring and initializing the geodrill logging subscriber
///
/// By default the console gets JSONL at `info` and nothing is written to disk.
pub struct GeodrillSubscriberBuilder {
    config: LogConfig,
}

impl GeodrillSubscriberBuilder {
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Level used when RUST_LOG is unset
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    pub fn with_console(mut self, console: ConsoleFormat) -> Self {
        self.config.console = console;
        self
    }

    /// Also write JSONL to `log`
    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.config.session_log = Some(log);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Initialize the subscriber globally
    ///
    /// The returned guard flushes the session log on drop and must be kept
    /// alive for the whole run. Failures are reported on stderr.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: logging not initialized: {e}");
                None
            }
        }
    }

    /// Try to initialize the subscriber globally
    ///
    /// Fails if the session log cannot be opened or a global subscriber has
    /// already been set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LogError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.level));

        let registry = Registry::default()
            .with(env_filter)
            .with(SessionContextLayer::new());

        let (session_sink, guard) = match &self.config.session_log {
            Some(log) => {
                let (writer, guard) = session_writer(log)?;
                (Some(writer), Some(guard))
            }
            None => (None, None),
        };

        let jsonl = &self.config.jsonl;

        // One arm per sink combination so each layer stack has a concrete type
        match (self.config.console, session_sink) {
            (ConsoleFormat::Pretty, Some(writer)) => {
                registry
                    .with(tracing_subscriber::fmt::layer().with_target(true))
                    .with(jsonl_layer(jsonl, writer))
                    .try_init()?;
            }
            (ConsoleFormat::Pretty, None) => {
                registry
                    .with(tracing_subscriber::fmt::layer().with_target(true))
                    .try_init()?;
            }
            (ConsoleFormat::Jsonl, Some(writer)) => {
                registry
                    .with(jsonl_layer(jsonl, std::io::stdout))
                    .with(jsonl_layer(jsonl, writer))
                    .try_init()?;
            }
            (ConsoleFormat::Jsonl, None) => {
                registry.with(jsonl_layer(jsonl, std::io::stdout)).try_init()?;
            }
            (ConsoleFormat::Off, Some(writer)) => {
                registry.with(jsonl_layer(jsonl, writer)).try_init()?;
            }
            (ConsoleFormat::Off, None) => {
                registry.try_init()?;
            }
        }

        Ok(guard)
    }
}

impl Default for GeodrillSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking writer for the session log
fn session_writer(log: &SessionLog) -> Result<(NonBlocking, WorkerGuard), LogError> {
    fs::create_dir_all(&log.directory)?;
    let rotation = match log.rotation {
        LogRotation::PerSession => {
            let file = File::create(log.session_file())?;
            return Ok(tracing_appender::non_blocking(file));
        }
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &log.directory, &log.file_prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging for tests (warnings only, repeat calls are no-ops)
pub fn init_testing() {
    let _ = GeodrillSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
