use authop_config::AuditObserverSettings;
use authop_deployment::DeploymentSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperatorSettings {
    /// Audit observer settings (owned path, upstream name, audit options)
    #[serde(default)]
    pub observer: AuditObserverSettings,
    /// Deployment synthesis settings
    #[serde(default)]
    pub deployment: DeploymentSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default derived via field defaults

impl OperatorSettings {
    pub fn validate(&self) -> Result<(), String> {
        self.observer.validate()?;
        self.deployment.validate()?;
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors while loading operator settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config build error: {0}")]
    Build(#[from] ::config::ConfigError),

    #[error("config validation error: {0}")]
    Invalid(String),
}

pub mod loader {
    use super::{OperatorSettings, SettingsError};
    use authop_deployment::settings::IMAGE_ENV_VAR;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    pub fn load_settings(path: Option<&str>) -> Result<OperatorSettings, SettingsError> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("authop.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., AUTHOP__DEPLOYMENT__LOG_LEVEL=4
        builder = builder.add_source(
            Environment::with_prefix("AUTHOP")
                .try_parsing(true)
                .separator("__"),
        );
        let mut merged: OperatorSettings = builder.build()?.try_deserialize()?;
        // The operator's own deployment passes the image in a dedicated variable
        if merged.deployment.image.is_none() {
            merged.deployment.image = std::env::var(IMAGE_ENV_VAR)
                .ok()
                .filter(|image| !image.is_empty());
        }
        merged.validate().map_err(SettingsError::Invalid)?;
        Ok(merged)
    }

    pub fn load_settings_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<OperatorSettings, SettingsError> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_settings(p.as_deref())
    }
}
