//! Upstream configuration sources
//!
//! This module provides read access to the cluster singletons observers depend on:
//! - Lister: snapshot lookup of one resource kind by name
//! - APIServer: audit profile from `apiservers.config.openshift.io/cluster`
//! - OAuth: audit profile from `oauths.config.openshift.io/cluster`

mod api_server;
mod lister;
mod oauth;

pub use api_server::{API_SERVER_RESOURCE, ApiServerProfileSource};
pub use lister::{InMemoryLister, Lister, ListerError};
pub use oauth::{OAUTH_RESOURCE, OAuthProfileSource};

use crate::resources::AuditProfile;

/// Capability to fetch an audit profile from one upstream resource kind
pub trait ProfileSource: Send + Sync {
    /// Resource kind this source reads (for logging and errors)
    fn resource(&self) -> &str;

    /// Fetch the audit profile of the named singleton
    fn audit_profile(&self, name: &str) -> Result<AuditProfile, ListerError>;
}

impl<S: ProfileSource + ?Sized> ProfileSource for Box<S> {
    fn resource(&self) -> &str {
        (**self).resource()
    }

    fn audit_profile(&self, name: &str) -> Result<AuditProfile, ListerError> {
        (**self).audit_profile(name)
    }
}
