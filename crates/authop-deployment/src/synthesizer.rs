//! Deployment synthesis.
//!
//! Applies a fixed sequence of steps to a freshly loaded deployment template:
//!
//! 1. rollout hash annotations (deployment and pod template)
//! 2. bootstrap user annotation
//! 3. image placeholder
//! 4. proxy environment
//! 5. log level placeholder
//! 6. identity provider volumes and mounts
//! 7. server arguments placeholder
//!
//! Any failing step aborts synthesis; no partially mutated manifest is
//! returned.

use std::collections::BTreeMap;

use authop_config::ObservedConfig;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Container;
use tracing::debug;

use crate::args::join_flags;
use crate::env::{ProxyStatus, proxy_env_vars};
use crate::extract::extract_server_arguments;
use crate::hash::rollout_hash;
use crate::idp::{IdpVolumeSource, VolumesAndMounts};
use crate::log_level::OperatorLogLevel;
use crate::settings::DeploymentSettings;
use crate::{Result, SynthesisError};

/// Annotation holding the rollout hash on the deployment and its pod template
pub const RVS_HASH_ANNOTATION: &str = "operator.openshift.io/rvs-hash";
/// Pod template annotation present while the bootstrap user still exists
pub const BOOTSTRAP_USER_ANNOTATION: &str = "operator.openshift.io/bootstrap-user-exists";

pub const IMAGE_PLACEHOLDER: &str = "${IMAGE}";
pub const LOG_LEVEL_PLACEHOLDER: &str = "${LOG_LEVEL}";
pub const SERVER_ARGUMENTS_PLACEHOLDER: &str = "${SERVER_ARGUMENTS}";

/// Everything a synthesis depends on besides the template
#[derive(Debug, Clone, Default)]
pub struct SynthesisInput {
    /// Versions of resources whose change must roll the pods
    pub tracked_versions: Vec<String>,
    pub bootstrap_user_exists: bool,
    pub proxy: ProxyStatus,
    pub operator_log_level: OperatorLogLevel,
    /// The operator's full observed config
    pub observed_config: ObservedConfig,
}

impl SynthesisInput {
    pub fn new(observed_config: ObservedConfig) -> Self {
        Self {
            observed_config,
            ..Default::default()
        }
    }

    pub fn with_tracked_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracked_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bootstrap_user(mut self, exists: bool) -> Self {
        self.bootstrap_user_exists = exists;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyStatus) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_operator_log_level(mut self, level: OperatorLogLevel) -> Self {
        self.operator_log_level = level;
        self
    }
}

/// Builds the OAuth server deployment from a template
pub struct DeploymentSynthesizer {
    settings: DeploymentSettings,
    idp: Box<dyn IdpVolumeSource>,
}

impl DeploymentSynthesizer {
    pub fn new(settings: DeploymentSettings, idp: impl IdpVolumeSource + 'static) -> Self {
        Self {
            settings,
            idp: Box::new(idp),
        }
    }

    pub fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    /// Apply every synthesis step to `deployment`.
    ///
    /// The template is consumed; callers load a fresh one for every pass.
    pub fn synthesize(
        &self,
        mut deployment: Deployment,
        input: &SynthesisInput,
    ) -> Result<Deployment> {
        let oauth_server_config = input
            .observed_config
            .section(&self.settings.observed_config_prefix)
            .map_err(SynthesisError::ObservedConfig)?;

        // force a rollout whenever any tracked resource changes
        let rvs_hash = rollout_hash(&input.tracked_versions);
        deployment
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(RVS_HASH_ANNOTATION.to_string(), rvs_hash.clone());

        let spec = deployment
            .spec
            .as_mut()
            .ok_or_else(|| SynthesisError::template("deployment has no spec"))?;
        let template_annotations = spec
            .template
            .metadata
            .get_or_insert_with(Default::default)
            .annotations
            .get_or_insert_with(BTreeMap::new);
        template_annotations.insert(RVS_HASH_ANNOTATION.to_string(), rvs_hash);
        if input.bootstrap_user_exists {
            template_annotations.insert(BOOTSTRAP_USER_ANNOTATION.to_string(), "true".to_string());
        }

        let pod_spec = spec
            .template
            .spec
            .as_mut()
            .ok_or_else(|| SynthesisError::template("pod template has no spec"))?;
        let container = pod_spec
            .containers
            .first_mut()
            .ok_or_else(|| SynthesisError::template("pod template has no containers"))?;

        self.resolve_image(container)?;

        let proxy_env = proxy_env_vars(&input.proxy);
        if !proxy_env.is_empty() {
            container.env.get_or_insert_with(Vec::new).extend(proxy_env);
        }

        let verbosity = self.settings.verbosity(input.operator_log_level).to_string();
        let command = first_argument(container)?;
        *command = command.replace(LOG_LEVEL_PLACEHOLDER, &verbosity);

        let VolumesAndMounts { volumes, mounts } = self
            .idp
            .volumes_and_mounts(&oauth_server_config)
            .map_err(SynthesisError::IdentityProviders)?;
        if !volumes.is_empty() {
            pod_spec.volumes.get_or_insert_with(Vec::new).extend(volumes);
        }
        if !mounts.is_empty() {
            container.volume_mounts.get_or_insert_with(Vec::new).extend(mounts);
        }

        let args =
            extract_server_arguments(&oauth_server_config, &self.settings.server_arguments_path)
                .map_err(SynthesisError::ServerArguments)?;
        let flags = args.to_flags();
        debug!(server_arguments = ?flags, "rendered server arguments");

        let command = first_argument(container)?;
        *command = command.replacen(SERVER_ARGUMENTS_PLACEHOLDER, &join_flags(&flags), 1);

        Ok(deployment)
    }

    /// Substitute the configured image for the placeholder, if present
    fn resolve_image(&self, container: &mut Container) -> Result<()> {
        if container.image.as_deref() != Some(IMAGE_PLACEHOLDER) {
            return Ok(());
        }
        let image = self
            .settings
            .image
            .as_deref()
            .filter(|image| !image.is_empty())
            .ok_or_else(|| SynthesisError::MissingImage {
                placeholder: IMAGE_PLACEHOLDER.to_string(),
            })?;
        container.image = Some(image.to_string());
        Ok(())
    }
}

/// The argument string the placeholders live in
fn first_argument(container: &mut Container) -> Result<&mut String> {
    let name = container.name.clone();
    container
        .args
        .as_mut()
        .and_then(|args| args.first_mut())
        .ok_or_else(|| SynthesisError::template(format!("container {name} has no arguments")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_argument_requires_args() {
        let mut container = Container {
            name: "oauth-openshift".to_string(),
            ..Default::default()
        };
        let err = first_argument(&mut container).unwrap_err();
        assert!(err.to_string().contains("container oauth-openshift has no arguments"));

        container.args = Some(vec!["exec server".to_string()]);
        assert_eq!(first_argument(&mut container).unwrap().as_str(), "exec server");
    }

    #[test]
    fn test_input_builder() {
        let input = SynthesisInput::new(ObservedConfig::new())
            .with_tracked_versions(["1", "2"])
            .with_bootstrap_user(true)
            .with_operator_log_level(OperatorLogLevel::Debug);
        assert_eq!(input.tracked_versions, vec!["1", "2"]);
        assert!(input.bootstrap_user_exists);
        assert_eq!(input.operator_log_level, OperatorLogLevel::Debug);
    }
}
