//! OAuth server deployment synthesis
//!
//! Turns a deployment template plus the operator's observed config into the
//! finished deployment manifest:
//! - Server arguments extracted from the observed config and rendered as
//!   shell-safe `--name=value` flags
//! - A rollout hash over tracked resource versions
//! - Proxy environment variables, image and log level substitution
//! - Volumes and mounts from the identity provider transform
//!
//! Synthesis is a pure function of its inputs: the same template and inputs
//! always produce the same manifest.

pub mod args;
pub mod env;
pub mod extract;
pub mod hash;
pub mod idp;
pub mod log_level;
pub mod settings;
pub mod shell;
pub mod synthesizer;

pub use args::{ArgumentMap, join_flags};
pub use env::{ProxyStatus, proxy_env_vars};
pub use extract::extract_server_arguments;
pub use hash::rollout_hash;
pub use idp::{IdpVolumeSource, NoIdentityProviders, VolumesAndMounts};
pub use log_level::OperatorLogLevel;
pub use settings::DeploymentSettings;
pub use shell::shell_escape;
pub use synthesizer::{DeploymentSynthesizer, SynthesisInput};

use authop_config::ConfigError;

/// Error produced by an external volume/mount transform
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// Server argument extraction errors
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(
        "unable to create server arguments, incorrect value {value} under {key} key, expected []string or string"
    )]
    MalformedValue {
        key: String,
        value: serde_json::Value,
    },

    #[error("server arguments at {path} must be a map, got {found}")]
    MalformedSection { path: String, found: &'static str },

    #[error("failed to read server arguments: {0}")]
    Path(#[from] ConfigError),
}

/// Deployment synthesis errors
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("invalid deployment template: {0}")]
    Template(String),

    #[error("image placeholder {placeholder} present but no image is configured")]
    MissingImage { placeholder: String },

    #[error("failed to grab the operator config: {0}")]
    ObservedConfig(#[source] ConfigError),

    #[error("unable to transform observed IDP sync data to volumes and mounts: {0}")]
    IdentityProviders(#[source] TransformError),

    #[error("unable to get server arguments: {0}")]
    ServerArguments(#[source] ExtractError),
}

impl SynthesisError {
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }
}

/// Result type for deployment synthesis
pub type Result<T> = std::result::Result<T, SynthesisError>;
