//! Observed configuration for the OAuth server operator
//!
//! This crate owns the loosely-typed "observed config" tree that the operator
//! persists between reconciliation passes, and the observers that fold
//! cluster-level settings into it:
//! - Path based get/set/remove/prune over the observed config tree
//! - Upstream listers and audit profile sources
//! - A generic audit observer with idempotent change detection
//! - An observation pass that merges the overlays of several observers
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   ┌───────────────┐
//! │ APIServer     │   │ OAuth         │     upstream singletons
//! │ lister        │   │ lister        │
//! └──────┬────────┘   └──────┬────────┘
//!        └──────────┬────────┘
//!             ProfileSource
//!                   │
//!            ┌──────▼───────┐
//!            │ AuditObserver│ ──► EventRecorder
//!            └──────┬───────┘
//!                   │ overlay (pruned to owned path)
//!            ┌──────▼───────┐
//!            │ObservationPass│ ──► merged ObservedConfig
//!            └──────────────┘
//! ```

pub mod events;
pub mod observed;
pub mod observer;
pub mod pass;
pub mod resources;
pub mod sources;

// Re-export main types
pub use events::{ChangeEvent, EventKind, EventRecorder, InMemoryRecorder, TracingRecorder};
pub use observed::{ConfigPath, ObservedConfig};
pub use observer::{AuditObserver, AuditObserverSettings, ConfigObserver, Observation};
pub use pass::{ObservationPass, PassOutcome};
pub use resources::{ApiServer, AuditProfile, OAuth};
pub use sources::{
    ApiServerProfileSource, InMemoryLister, Lister, ListerError, OAuthProfileSource, ProfileSource,
};

/// Error types for observed config tree operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config path must have at least one segment")]
    EmptyPath,

    #[error("Value at '{segment}' of path {path} is {found}, expected a map")]
    NotAMap {
        path: String,
        segment: String,
        found: &'static str,
    },
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Errors reported by an observer for a single pass
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    #[error("failed to get {resource}/{name}: {source}")]
    Upstream {
        resource: String,
        name: String,
        #[source]
        source: ListerError,
    },

    #[error("set nested field ({path}) for profile ({profile}): {source}")]
    SetField {
        path: String,
        profile: AuditProfile,
        #[source]
        source: ConfigError,
    },

    #[error("read nested field ({path}): {source}")]
    ReadField {
        path: String,
        #[source]
        source: ConfigError,
    },
}

/// Result type for observed config operations
pub type Result<T> = std::result::Result<T, ConfigError>;
