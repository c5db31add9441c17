//! Observation pass over a set of observers.
//!
//! Every observer sees the same existing config. Their overlays are merged in
//! registration order into a fresh config, so the outcome only holds the paths
//! the observers own. Change detection compares it with the owned paths of the
//! existing config; keys nobody owns are neither reported nor touched, and
//! [`ObservedConfig::with_overlay`] puts the outcome back into the persisted
//! tree. An observer that fails hands back the existing config, which keeps
//! its previously observed values in the merge.

use tracing::{info, warn};

use crate::ObserveError;
use crate::events::EventRecorder;
use crate::observed::{ConfigPath, ObservedConfig};
use crate::observer::ConfigObserver;

/// Event reason used when a pass produces a different observed config
pub const OBSERVED_CONFIG_EVENT_REASON: &str = "ObservedConfigChanged";

/// Result of running every observer once
#[derive(Debug)]
pub struct PassOutcome {
    /// Merged overlays of all observers
    pub config: ObservedConfig,
    /// Whether `config` differs from the owned paths of the existing config
    pub changed: bool,
    pub errors: Vec<ObserveError>,
}

impl PassOutcome {
    /// The merged config, or every error collected during the pass
    pub fn into_result(self) -> Result<ObservedConfig, Vec<ObserveError>> {
        if self.errors.is_empty() {
            Ok(self.config)
        } else {
            Err(self.errors)
        }
    }
}

/// Ordered set of observers run together in one reconciliation pass
#[derive(Default)]
pub struct ObservationPass {
    observers: Vec<Box<dyn ConfigObserver>>,
}

impl ObservationPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: impl ConfigObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn push(&mut self, observer: Box<dyn ConfigObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Every path owned by one of the observers, in registration order
    pub fn owned_paths(&self) -> Vec<ConfigPath> {
        self.observers
            .iter()
            .flat_map(|observer| observer.owned_paths())
            .collect()
    }

    pub fn run(&self, recorder: &dyn EventRecorder, existing: &ObservedConfig) -> PassOutcome {
        let mut merged = ObservedConfig::new();
        let mut errors = Vec::new();

        for observer in &self.observers {
            let observation = observer.observe(recorder, existing);
            for err in &observation.errors {
                warn!(observer = %observer.name(), error = %err, "observer failed");
            }
            merged.merge(observation.config);
            errors.extend(observation.errors);
        }

        let previous = existing.pruned(&self.owned_paths());
        let changed = merged != previous;
        if changed && errors.is_empty() {
            let keys = changed_keys(&previous, &merged);
            recorder.event(
                OBSERVED_CONFIG_EVENT_REASON,
                format!("Writing updated observed config: {}", keys.join(", ")),
            );
        }

        info!(
            observers = self.observers.len(),
            changed,
            errors = errors.len(),
            "observation pass completed"
        );

        PassOutcome {
            config: merged,
            changed,
            errors,
        }
    }
}

/// Top-level keys whose values differ between `before` and `after`, sorted
fn changed_keys(before: &ObservedConfig, after: &ObservedConfig) -> Vec<String> {
    let mut keys: Vec<String> = before
        .as_map()
        .keys()
        .chain(after.as_map().keys())
        .filter(|key| before.as_map().get(*key) != after.as_map().get(*key))
        .cloned()
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_keys() {
        let before = ObservedConfig::from_value(json!({ "a": 1, "b": 2, "c": 3 })).unwrap();
        let after = ObservedConfig::from_value(json!({ "a": 1, "b": 5, "d": 4 })).unwrap();
        assert_eq!(changed_keys(&before, &after), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_empty_pass_owns_nothing() {
        let pass = ObservationPass::new();
        let recorder = crate::events::InMemoryRecorder::new();
        let existing = ObservedConfig::from_value(json!({ "stale": true })).unwrap();

        let outcome = pass.run(&recorder, &existing);
        assert!(pass.owned_paths().is_empty());
        assert!(outcome.config.is_empty());
        assert!(!outcome.changed);
        assert!(outcome.errors.is_empty());
        assert!(recorder.is_empty());
    }
}
