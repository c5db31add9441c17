//! Reconciliation pass for the OAuth server.
//!
//! Runs the config observers over the OAuth server section of the operator's
//! observed config, then synthesizes the deployment from the updated config:
//! - Only the observers' owned paths in the section are rewritten; other keys
//!   such as the identity provider config are carried over
//! - Observer errors abort the pass before anything is synthesized
//! - The returned observed config and deployment are only meant to be
//!   persisted together, after the whole pass succeeded

use std::sync::Arc;

use authop_config::{
    ApiServer, ApiServerProfileSource, AuditObserver, ConfigError, EventRecorder, Lister,
    ObservationPass, ObserveError, ObservedConfig,
};
use authop_deployment::{DeploymentSynthesizer, IdpVolumeSource, SynthesisError, SynthesisInput};
use k8s_openapi::api::apps::v1::Deployment;
use thiserror::Error;

use crate::config::OperatorSettings;

/// Errors that abort a reconciliation pass
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("config observation failed: {}", join_errors(.0))]
    Observation(Vec<ObserveError>),

    #[error("invalid observed config: {0}")]
    ObservedConfig(#[from] ConfigError),

    #[error("deployment synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

fn join_errors(errors: &[ObserveError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of a successful pass
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The operator's observed config with the updated OAuth server section
    pub observed_config: ObservedConfig,
    /// Whether the OAuth server section changed in this pass
    pub observed_changed: bool,
    pub deployment: Deployment,
}

pub struct ReconcilePass {
    observers: ObservationPass,
    synthesizer: DeploymentSynthesizer,
    recorder: Arc<dyn EventRecorder>,
}

impl ReconcilePass {
    pub fn new(
        observers: ObservationPass,
        synthesizer: DeploymentSynthesizer,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        Self {
            observers,
            synthesizer,
            recorder,
        }
    }

    /// Standard wiring: the audit profile comes from the cluster APIServer.
    pub fn from_settings<L>(
        settings: &OperatorSettings,
        api_servers: L,
        idp: impl IdpVolumeSource + 'static,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self
    where
        L: Lister<ApiServer> + 'static,
    {
        let observers = ObservationPass::new().with_observer(AuditObserver::new(
            ApiServerProfileSource::new(api_servers),
            settings.observer.clone(),
        ));
        let synthesizer = DeploymentSynthesizer::new(settings.deployment.clone(), idp);
        Self::new(observers, synthesizer, recorder)
    }

    /// Observe, then synthesize.
    ///
    /// `input.observed_config` is the operator's persisted observed config;
    /// `template` is a freshly loaded deployment template.
    pub fn run(
        &self,
        template: Deployment,
        mut input: SynthesisInput,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let prefix = self.synthesizer.settings().observed_config_prefix.clone();
        let existing = input.observed_config.section(&prefix)?;

        let overlay = self
            .observers
            .run(self.recorder.as_ref(), &existing)
            .into_result()
            .map_err(ReconcileError::Observation)?;
        let section = existing.with_overlay(&self.observers.owned_paths(), overlay)?;
        let observed_changed = section != existing;

        input.observed_config.set_section(&prefix, section);
        let deployment = self.synthesizer.synthesize(template, &input)?;

        tracing::info!(
            observed_changed,
            tracked_versions = input.tracked_versions.len(),
            "OAuth server reconciled"
        );

        Ok(ReconcileOutcome {
            observed_config: input.observed_config,
            observed_changed,
            deployment,
        })
    }
}
