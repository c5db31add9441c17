//! Seam for the identity provider volume/mount transform.
//!
//! Turning identity provider sync descriptors into volumes and mounts lives
//! outside this crate; the synthesizer only appends what the transform returns.

use authop_config::ObservedConfig;
use k8s_openapi::api::core::v1::{Volume, VolumeMount};

use crate::TransformError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumesAndMounts {
    pub volumes: Vec<Volume>,
    pub mounts: Vec<VolumeMount>,
}

/// Produces the volumes and mounts needed by the configured identity providers
pub trait IdpVolumeSource: Send + Sync {
    /// `oauth_server_config` is the OAuth server section of the observed config
    fn volumes_and_mounts(
        &self,
        oauth_server_config: &ObservedConfig,
    ) -> Result<VolumesAndMounts, TransformError>;
}

impl<F> IdpVolumeSource for F
where
    F: Fn(&ObservedConfig) -> Result<VolumesAndMounts, TransformError> + Send + Sync,
{
    fn volumes_and_mounts(
        &self,
        oauth_server_config: &ObservedConfig,
    ) -> Result<VolumesAndMounts, TransformError> {
        self(oauth_server_config)
    }
}

/// Transform for clusters without identity providers that need files mounted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentityProviders;

impl IdpVolumeSource for NoIdentityProviders {
    fn volumes_and_mounts(&self, _: &ObservedConfig) -> Result<VolumesAndMounts, TransformError> {
        Ok(VolumesAndMounts::default())
    }
}
