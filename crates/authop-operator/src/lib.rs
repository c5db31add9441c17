//! OAuth server operator wiring
//!
//! Settings loading, tracing setup and the reconciliation pass that ties the
//! config observers to deployment synthesis.

pub mod config;
pub mod observability;
pub mod reconcile;

pub use config::{LoggingConfig, OperatorSettings, SettingsError};
pub use reconcile::{ReconcileError, ReconcileOutcome, ReconcilePass};
