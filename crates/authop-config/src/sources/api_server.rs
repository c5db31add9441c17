//! Audit profile from the cluster `APIServer` configuration

use super::{Lister, ListerError, ProfileSource};
use crate::resources::{ApiServer, AuditProfile};

/// Resource kind read by [`ApiServerProfileSource`]
pub const API_SERVER_RESOURCE: &str = "apiservers.config.openshift.io";

/// Reads `spec.audit.profile` of the cluster API server configuration
pub struct ApiServerProfileSource<L> {
    lister: L,
}

impl<L: Lister<ApiServer>> ApiServerProfileSource<L> {
    pub fn new(lister: L) -> Self {
        Self { lister }
    }
}

impl<L: Lister<ApiServer>> ProfileSource for ApiServerProfileSource<L> {
    fn resource(&self) -> &str {
        API_SERVER_RESOURCE
    }

    fn audit_profile(&self, name: &str) -> Result<AuditProfile, ListerError> {
        self.lister
            .get(name)
            .map(|api_server| api_server.spec.audit.profile)
    }
}
