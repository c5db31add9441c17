//! Audit profile from the cluster `OAuth` configuration

use super::{Lister, ListerError, ProfileSource};
use crate::resources::{AuditProfile, OAuth};

/// Resource kind read by [`OAuthProfileSource`]
pub const OAUTH_RESOURCE: &str = "oauths.config.openshift.io";

/// Reads `spec.audit.profile` of the cluster OAuth configuration
pub struct OAuthProfileSource<L> {
    lister: L,
}

impl<L: Lister<OAuth>> OAuthProfileSource<L> {
    pub fn new(lister: L) -> Self {
        Self { lister }
    }
}

impl<L: Lister<OAuth>> ProfileSource for OAuthProfileSource<L> {
    fn resource(&self) -> &str {
        OAUTH_RESOURCE
    }

    fn audit_profile(&self, name: &str) -> Result<AuditProfile, ListerError> {
        self.lister.get(name).map(|oauth| oauth.spec.audit.profile)
    }
}
