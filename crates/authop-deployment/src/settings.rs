use authop_config::ConfigPath;
use serde::{Deserialize, Serialize};

use crate::log_level::OperatorLogLevel;

/// Environment variable carrying the OAuth server image in operator deployments
pub const IMAGE_ENV_VAR: &str = "IMAGE_OAUTH_SERVER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSettings {
    /// Image substituted for the `${IMAGE}` placeholder
    #[serde(default)]
    pub image: Option<String>,
    /// Key of the OAuth server section in the operator's observed config
    #[serde(default = "default_observed_config_prefix")]
    pub observed_config_prefix: String,
    /// Path of the server arguments inside the OAuth server section
    #[serde(default = "default_server_arguments_path")]
    pub server_arguments_path: ConfigPath,
    /// Verbosity used for `${LOG_LEVEL}` unless `derive_log_level` is set
    #[serde(default = "default_log_level")]
    pub log_level: u32,
    /// Derive the verbosity from the operator log level instead
    #[serde(default)]
    pub derive_log_level: bool,
}

fn default_observed_config_prefix() -> String {
    "oauthServer".to_string()
}

fn default_server_arguments_path() -> ConfigPath {
    ConfigPath::single("serverArguments")
}

fn default_log_level() -> u32 {
    5
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            image: None,
            observed_config_prefix: default_observed_config_prefix(),
            server_arguments_path: default_server_arguments_path(),
            log_level: default_log_level(),
            derive_log_level: false,
        }
    }
}

impl DeploymentSettings {
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Verbosity substituted into the server command line
    pub fn verbosity(&self, operator_level: OperatorLogLevel) -> u32 {
        if self.derive_log_level {
            operator_level.verbosity()
        } else {
            self.log_level
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.observed_config_prefix.is_empty() {
            return Err("deployment.observed_config_prefix must not be empty".into());
        }
        if self.server_arguments_path.is_empty() {
            return Err("deployment.server_arguments_path must not be empty".into());
        }
        if self.log_level > 100 {
            return Err("deployment.log_level must be <= 100".into());
        }
        if matches!(self.image.as_deref(), Some("")) {
            return Err("deployment.image must not be empty when set".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DeploymentSettings::default();
        assert_eq!(settings.observed_config_prefix, "oauthServer");
        assert_eq!(settings.server_arguments_path.to_string(), "serverArguments");
        assert_eq!(settings.log_level, 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_pinned_verbosity_ignores_operator_level() {
        let settings = DeploymentSettings::default();
        assert_eq!(settings.verbosity(OperatorLogLevel::TraceAll), 5);
    }

    #[test]
    fn test_derived_verbosity() {
        let settings = DeploymentSettings {
            derive_log_level: true,
            ..Default::default()
        };
        assert_eq!(settings.verbosity(OperatorLogLevel::Debug), 4);
    }

    #[test]
    fn test_validation() {
        let settings = DeploymentSettings {
            log_level: 101,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(DeploymentSettings::default().with_image("").validate().is_err());
    }
}
