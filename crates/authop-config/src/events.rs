//! Change events emitted by observers
//!
//! Events are free text for audit and history; nothing downstream parses them.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Normal,
    Warning,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// Human-readable record of an observed change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: EventKind,
    /// Short machine-friendly reason, e.g. `ObserveAuditProfile`
    pub reason: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChangeEvent {
    pub fn new(kind: EventKind, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn normal(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Normal, reason, message)
    }

    pub fn warning(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Warning, reason, message)
    }
}

/// Sink for change events
pub trait EventRecorder: Send + Sync {
    fn record(&self, event: ChangeEvent);

    fn event(&self, reason: &str, message: String) {
        self.record(ChangeEvent::normal(reason, message));
    }

    fn warning(&self, reason: &str, message: String) {
        self.record(ChangeEvent::warning(reason, message));
    }
}

/// Recorder that keeps every event in memory.
///
/// Callers that forward events elsewhere drain it with [`take`](Self::take)
/// after each pass.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    events: Mutex<Vec<ChangeEvent>>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventRecorder for InMemoryRecorder {
    fn record(&self, event: ChangeEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Recorder that writes every event to the tracing log
#[derive(Debug, Clone)]
pub struct TracingRecorder {
    component: String,
}

impl TracingRecorder {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl EventRecorder for TracingRecorder {
    fn record(&self, event: ChangeEvent) {
        match event.kind {
            EventKind::Normal => tracing::info!(
                component = %self.component,
                reason = %event.reason,
                "{}",
                event.message
            ),
            EventKind::Warning => tracing::warn!(
                component = %self.component,
                reason = %event.reason,
                "{}",
                event.message
            ),
        }
    }
}
