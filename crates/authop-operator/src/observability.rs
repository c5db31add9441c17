//! Tracing setup for the operator.
//!
//! The filter sits behind a reload layer: the configured `logging.level` is the
//! starting point and the operator log level of the cluster configuration can
//! raise it later without reinstalling the subscriber.

use std::sync::OnceLock;

use authop_deployment::OperatorLogLevel;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

pub fn init_tracing(logging: &LoggingConfig) {
    init_tracing_with_level(&logging.level);
}

/// `RUST_LOG` wins over `level` when it is set and valid.
pub fn init_tracing_with_level(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init();
}

/// Swap the active filter. Returns false before [`init_tracing`] ran.
pub fn apply_logging_level(level: &str) -> bool {
    let Some(handle) = FILTER_HANDLE.get() else {
        return false;
    };
    handle.modify(|filter| *filter = EnvFilter::new(level)).is_ok()
}

/// Filter matching an operator log level; `Normal` keeps the configured one
pub fn operator_filter(level: OperatorLogLevel) -> Option<&'static str> {
    match level {
        OperatorLogLevel::Normal => None,
        OperatorLogLevel::Debug => Some("debug"),
        OperatorLogLevel::Trace | OperatorLogLevel::TraceAll => Some("trace"),
    }
}

/// Raise the filter to the operator log level, if it asks for more than `Normal`
pub fn apply_operator_log_level(level: OperatorLogLevel) -> bool {
    match operator_filter(level) {
        Some(filter) => {
            let applied = apply_logging_level(filter);
            if applied {
                tracing::debug!(operator_log_level = %level, filter, "log filter raised");
            }
            applied
        }
        None => false,
    }
}
