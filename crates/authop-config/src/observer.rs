//! Audit profile observer
//!
//! Reads the audit profile from one upstream singleton and maps it onto the
//! server arguments subtree of the OAuth server's observed config. The same
//! observer serves every upstream kind; only the injected [`ProfileSource`]
//! differs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::ObserveError;
use crate::events::EventRecorder;
use crate::observed::{ConfigPath, ObservedConfig};
use crate::resources::AuditProfile;
use crate::sources::ProfileSource;

/// Event reason used when the observed audit configuration changes
pub const AUDIT_PROFILE_EVENT_REASON: &str = "ObserveAuditProfile";

/// Outcome of one observer run.
///
/// Either the observer's pruned overlay with no errors, or the existing config
/// unchanged together with at least one error.
#[derive(Debug)]
pub struct Observation {
    pub config: ObservedConfig,
    pub errors: Vec<ObserveError>,
}

impl Observation {
    pub fn observed(config: ObservedConfig) -> Self {
        Self {
            config,
            errors: Vec::new(),
        }
    }

    pub fn failed(existing: &ObservedConfig, error: ObserveError) -> Self {
        Self {
            config: existing.clone(),
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<ObservedConfig, Vec<ObserveError>> {
        if self.errors.is_empty() {
            Ok(self.config)
        } else {
            Err(self.errors)
        }
    }
}

/// A component that contributes one overlay to the observed config
pub trait ConfigObserver: Send + Sync {
    /// Name of this observer (for logging and debugging)
    fn name(&self) -> &str;

    /// Paths of the observed config this observer owns
    fn owned_paths(&self) -> Vec<ConfigPath>;

    fn observe(&self, recorder: &dyn EventRecorder, existing: &ObservedConfig) -> Observation;
}

/// Construction-time settings of an [`AuditObserver`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditObserverSettings {
    /// Path of the observed config owned by the observer
    #[serde(default = "default_owned_path")]
    pub owned_path: ConfigPath,
    /// Name of the upstream singleton
    #[serde(default = "default_resource_name")]
    pub resource_name: String,
    /// Server arguments written while audit logging is enabled
    #[serde(default = "default_audit_options")]
    pub audit_options: BTreeMap<String, Vec<String>>,
}

fn default_owned_path() -> ConfigPath {
    ConfigPath::single("serverArguments")
}

fn default_resource_name() -> String {
    "cluster".to_string()
}

fn default_audit_options() -> BTreeMap<String, Vec<String>> {
    [
        ("audit-log-path", "/var/log/oauth-server/audit.log"),
        ("audit-log-format", "json"),
        ("audit-log-maxsize", "100"),
        ("audit-log-maxbackup", "10"),
        ("audit-policy-file", "/var/run/configmaps/audit/audit.yaml"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), vec![value.to_string()]))
    .collect()
}

impl Default for AuditObserverSettings {
    fn default() -> Self {
        Self {
            owned_path: default_owned_path(),
            resource_name: default_resource_name(),
            audit_options: default_audit_options(),
        }
    }
}

impl AuditObserverSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.owned_path.is_empty() {
            return Err("observer.owned_path must not be empty".into());
        }
        if self.owned_path.segments().iter().any(String::is_empty) {
            return Err("observer.owned_path segments must not be empty".into());
        }
        if self.resource_name.is_empty() {
            return Err("observer.resource_name must not be empty".into());
        }
        if self.audit_options.keys().any(String::is_empty) {
            return Err("observer.audit_options names must not be empty".into());
        }
        Ok(())
    }

    /// The audit options as the JSON subtree written at the owned path
    fn options_value(&self) -> Value {
        Value::Object(
            self.audit_options
                .iter()
                .map(|(name, values)| {
                    let values = values.iter().cloned().map(Value::String).collect();
                    (name.clone(), Value::Array(values))
                })
                .collect(),
        )
    }
}

/// Observer mapping an upstream audit profile onto server arguments
pub struct AuditObserver<S> {
    name: String,
    source: S,
    settings: AuditObserverSettings,
}

impl<S: ProfileSource> AuditObserver<S> {
    pub fn new(source: S, settings: AuditObserverSettings) -> Self {
        let name = format!("audit({})", source.resource());
        Self {
            name,
            source,
            settings,
        }
    }

    pub fn settings(&self) -> &AuditObserverSettings {
        &self.settings
    }

    /// Subtree to write for `profile`; `None` when the path must stay absent
    fn desired(&self, profile: AuditProfile) -> Option<Value> {
        if profile.is_disabled() {
            None
        } else {
            Some(self.settings.options_value())
        }
    }
}

impl<S: ProfileSource> ConfigObserver for AuditObserver<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn owned_paths(&self) -> Vec<ConfigPath> {
        vec![self.settings.owned_path.clone()]
    }

    fn observe(&self, recorder: &dyn EventRecorder, existing: &ObservedConfig) -> Observation {
        let path = &self.settings.owned_path;
        let resource_name = &self.settings.resource_name;

        let profile = match self.source.audit_profile(resource_name) {
            Ok(profile) => profile,
            Err(err) if err.is_not_found() => {
                warn!(
                    resource = %self.source.resource(),
                    name = %resource_name,
                    "upstream audit configuration not found, using the default profile"
                );
                AuditProfile::default()
            }
            Err(source) => {
                return Observation::failed(
                    existing,
                    ObserveError::Upstream {
                        resource: self.source.resource().to_string(),
                        name: resource_name.clone(),
                        source,
                    },
                );
            }
        };

        let desired = self.desired(profile);
        let mut observed = ObservedConfig::new();
        if let Some(value) = &desired {
            if let Err(source) = observed.set(path, value.clone()) {
                return Observation::failed(
                    existing,
                    ObserveError::SetField {
                        path: path.to_string(),
                        profile,
                        source,
                    },
                );
            }
        }

        let current = match existing.get(path) {
            Ok(current) => current,
            Err(source) => {
                return Observation::failed(
                    existing,
                    ObserveError::ReadField {
                        path: path.to_string(),
                        source,
                    },
                );
            }
        };

        if current != desired.as_ref() {
            recorder.event(
                AUDIT_PROFILE_EVENT_REASON,
                format!(
                    "AuditProfile changed from '{}' to '{}'",
                    render(current),
                    render(desired.as_ref())
                ),
            );
        } else {
            debug!(observer = %self.name, %profile, "audit configuration unchanged");
        }

        Observation::observed(observed.pruned(&self.owned_paths()))
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<none>".to_string(),
    }
}
