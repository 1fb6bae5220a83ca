//! Logging configuration for a dashboard run
//!
//! A run writes to the console in one of three formats and can additionally
//! keep a JSONL session log on disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level used when RUST_LOG is unset
    pub level: String,
    pub console: ConsoleFormat,
    pub session_log: Option<SessionLog>,
    pub jsonl: JsonlConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleFormat::Jsonl,
            session_log: None,
            jsonl: JsonlConfig::default(),
        }
    }
}

impl LogConfig {
    /// Console-only logging at `level`
    pub fn dashboard(level: impl Into<String>, console: ConsoleFormat) -> Self {
        Self {
            level: level.into(),
            console,
            ..Default::default()
        }
    }

    /// Warnings only, plain console
    pub fn testing() -> Self {
        Self::dashboard("warn", ConsoleFormat::Jsonl)
    }

    /// Also record the run in `log`
    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session_log = Some(log);
        self
    }
}

/// How console output is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    Off,
    #[default]
    Jsonl,
    /// Human-readable with ANSI colors
    Pretty,
}

impl ConsoleFormat {
    pub fn from_pretty_flag(pretty: bool) -> Self {
        if pretty {
            ConsoleFormat::Pretty
        } else {
            ConsoleFormat::Jsonl
        }
    }
}

/// JSONL log file for a dashboard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLog {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub rotation: LogRotation,
}

impl Default for SessionLog {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            file_prefix: "geodrill".to_string(),
            rotation: LogRotation::PerSession,
        }
    }
}

impl SessionLog {
    /// One file per session in `directory`, named after `session_id`
    pub fn for_session(directory: impl Into<PathBuf>, session_id: Uuid) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: format!("geodrill-{session_id}"),
            rotation: LogRotation::PerSession,
        }
    }

    /// Shared rolling files in `directory`
    pub fn rolling(directory: impl Into<PathBuf>, rotation: LogRotation) -> Self {
        Self {
            directory: directory.into(),
            rotation,
            ..Default::default()
        }
    }

    /// Path of the file written for `PerSession` rotation
    pub fn session_file(&self) -> PathBuf {
        self.directory.join(format!("{}.jsonl", self.file_prefix))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    /// A single file, truncated when the session starts
    #[default]
    PerSession,
    Daily,
    Hourly,
}

/// Fields included in each JSONL line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonlConfig {
    /// Event fields at the top level instead of under `fields`
    pub flatten_events: bool,
    pub include_spans: bool,
    /// Source file and line
    pub include_location: bool,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            flatten_events: true,
            include_spans: true,
            include_location: false,
        }
    }
}
