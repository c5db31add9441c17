//! Upstream cluster configuration resources read by the observers.
//!
//! Only the fields the observers consume are modelled; everything else in the
//! upstream documents is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Audit logging profile of a cluster API server or OAuth server.
///
/// The zero value (an unset profile upstream) is [`AuditProfile::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AuditProfile {
    /// Disables audit logging
    None,
    #[default]
    Default,
    WriteRequestBodies,
    AllRequestBodies,
}

impl AuditProfile {
    /// Whether this profile turns audit logging off
    pub fn is_disabled(self) -> bool {
        self == Self::None
    }
}

impl std::fmt::Display for AuditProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Default => write!(f, "Default"),
            Self::WriteRequestBodies => write!(f, "WriteRequestBodies"),
            Self::AllRequestBodies => write!(f, "AllRequestBodies"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    #[serde(default)]
    pub profile: AuditProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

/// Cluster-scoped `apiservers.config.openshift.io` singleton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServer {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ApiServerSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServerSpec {
    #[serde(default)]
    pub audit: Audit,
}

/// Cluster-scoped `oauths.config.openshift.io` singleton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: OAuthSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSpec {
    #[serde(default)]
    pub audit: Audit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_server_deserializes_profile() {
        let api_server: ApiServer = serde_json::from_value(json!({
            "metadata": { "name": "cluster", "resourceVersion": "42" },
            "spec": { "audit": { "profile": "WriteRequestBodies" }, "servingCerts": {} }
        }))
        .unwrap();
        assert_eq!(api_server.metadata.name, "cluster");
        assert_eq!(api_server.spec.audit.profile, AuditProfile::WriteRequestBodies);
    }

    #[test]
    fn test_missing_profile_is_default() {
        let oauth: OAuth = serde_json::from_value(json!({ "spec": {} })).unwrap();
        assert_eq!(oauth.spec.audit.profile, AuditProfile::Default);
        assert!(!oauth.spec.audit.profile.is_disabled());
        assert!(AuditProfile::None.is_disabled());
    }
}
