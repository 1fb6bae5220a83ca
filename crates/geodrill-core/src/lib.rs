//! # Geodrill Core
//!
//! Data, caching and state logic for the geographic drill-down dashboard.
//!
//! A user narrows a selection continent → country → state/province → city.
//! Each change cascades: deeper tiers are cleared, dependent option lists
//! are refetched through a memoizing cache, the detail tables and climate
//! chart re-render, and the selection is mirrored into a shareable query
//! string.
//!
//! ## Key Traits
//!
//! - [`GeoDataProvider`]: Async source of option lists and detail records
//! - [`FailurePolicy`]: Injectable failure decision for providers and the cache
//! - [`Clock`]: Suspension points for simulated latency
//!
//! ## Key Types
//!
//! - [`GeoCache`]: LRU memoization with swallow-or-re-raise error handling
//! - [`Selection`] / [`SelectionStore`]: Cascading selection state and its observers
//! - [`NotificationCenter`]: Single auto-dismissing error notification
//! - [`DashboardSession`]: Per-session composition of the above

pub mod tier;
pub mod error;
pub mod clock;
pub mod failure;
pub mod provider;
pub mod cache;
pub mod query;
pub mod selection;
pub mod notify;
pub mod chart;
pub mod view;
pub mod config;
pub mod session;

// Re-export main types
pub use tier::*;
pub use error::*;
pub use clock::*;
pub use failure::*;
pub use provider::*;
pub use cache::*;
pub use query::*;
pub use selection::*;
pub use notify::*;
pub use chart::*;
pub use view::*;
pub use config::*;
pub use session::*;
