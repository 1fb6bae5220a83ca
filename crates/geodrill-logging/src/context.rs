//! Session context injection
//!
//! Thread-local storage for the dashboard session identity, so every span
//! opened within a scope can be tagged with the session it belongs to.

use std::cell::RefCell;

use uuid::Uuid;

/// Session context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContextData {
    /// Unique id of this dashboard session
    pub session_id: Uuid,
    /// Human-readable label (window title, test name)
    pub label: String,
}

thread_local! {
    static SESSION_CONTEXT: RefCell<Option<SessionContextData>> = const { RefCell::new(None) };
}

/// RAII guard for session context
///
/// Sets the session context for the current thread and restores the
/// previous one (if any) on drop.
///
/// ```ignore
/// let _guard = SessionContextGuard::new("dashboard");
/// let _span = _guard.span().entered();
/// tracing::info!("window opened");
/// ```
pub struct SessionContextGuard {
    data: SessionContextData,
    previous: Option<SessionContextData>,
}

impl SessionContextGuard {
    /// Enter a fresh session with a random id
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_session_id(label, Uuid::new_v4())
    }

    /// Enter a session with a known id
    pub fn with_session_id(label: impl Into<String>, session_id: Uuid) -> Self {
        let data = SessionContextData {
            session_id,
            label: label.into(),
        };
        let previous = SESSION_CONTEXT.with(|ctx| ctx.borrow_mut().replace(data.clone()));
        Self { data, previous }
    }

    pub fn session_id(&self) -> Uuid {
        self.data.session_id
    }

    /// A span carrying the session fields, for formatters that print spans
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "session",
            session_id = %self.data.session_id,
            label = %self.data.label
        )
    }

    /// Get the current session context (if any)
    pub fn current() -> Option<SessionContextData> {
        SESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Get the current session id (if set)
    pub fn current_session_id() -> Option<Uuid> {
        Self::current().map(|ctx| ctx.session_id)
    }
}

impl Drop for SessionContextGuard {
    fn drop(&mut self) {
        SESSION_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}
