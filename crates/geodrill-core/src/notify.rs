//! Transient error notifications
//!
//! At most one notification is visible: raising a new one replaces the
//! current one. A recurring timer dismisses whatever is showing when it
//! fires, so a notification stays up for at most one period.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

/// Auto-dismiss timer period
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(8);

/// Shortest auto-dismiss period the timer accepts
pub const MIN_DISMISS_PERIOD: Duration = Duration::from_millis(1);

/// Severity of a notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Error => "❌",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Info => "ℹ️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::Error => "ERROR",
            NotificationKind::Warning => "WARNING",
            NotificationKind::Info => "INFO",
        }
    }

    /// CSS class suffix for the toast
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotification {
    pub show: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub id: Option<Uuid>,
}

impl ErrorNotification {
    /// The cleared state
    pub fn hidden() -> Self {
        Self {
            show: false,
            message: String::new(),
            kind: NotificationKind::Error,
            id: None,
        }
    }
}

impl Default for ErrorNotification {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Single-slot notification channel
#[derive(Debug)]
pub struct NotificationCenter {
    tx: watch::Sender<ErrorNotification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(ErrorNotification::hidden()),
        }
    }

    /// Show a notification, replacing any current one
    pub fn raise(&self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        let id = Uuid::new_v4();
        let notification = ErrorNotification {
            show: true,
            message: message.into(),
            kind,
            id: Some(id),
        };
        tracing::info!(
            id = %id,
            kind = kind.as_str(),
            message = %notification.message,
            "notification raised"
        );
        self.tx.send_replace(notification);
        id
    }

    pub fn raise_error(&self, message: impl Into<String>) -> Uuid {
        self.raise(message, NotificationKind::Error)
    }

    /// Hide the current notification; returns whether one was showing
    pub fn dismiss(&self) -> bool {
        self.tx.send_if_modified(|current| {
            if !current.show {
                return false;
            }
            tracing::debug!(id = ?current.id, "notification dismissed");
            *current = ErrorNotification::hidden();
            true
        })
    }

    /// Hide the notification only if it is still the one with `id`
    pub fn dismiss_id(&self, id: Uuid) -> bool {
        if self.tx.borrow().id != Some(id) {
            return false;
        }
        self.dismiss()
    }

    /// Timer handler: dismiss if something is showing
    pub fn tick(&self) -> bool {
        self.dismiss()
    }

    pub fn current(&self) -> ErrorNotification {
        self.tx.borrow().clone()
    }

    pub fn is_showing(&self) -> bool {
        self.tx.borrow().show
    }

    pub fn subscribe(&self) -> watch::Receiver<ErrorNotification> {
        self.tx.subscribe()
    }

    /// Run the auto-dismiss timer on the tokio runtime
    ///
    /// The first tick fires one `period` after spawning; periods shorter than
    /// [`MIN_DISMISS_PERIOD`] are raised to it. The task ends once the center
    /// is dropped.
    pub fn spawn_auto_dismiss(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let period = period.max(MIN_DISMISS_PERIOD);
        let center: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(center) = center.upgrade() else {
                    break;
                };
                center.tick();
            }
        })
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
