//! Container environment derived from the cluster proxy configuration

use k8s_openapi::api::core::v1::EnvVar;
use serde::{Deserialize, Serialize};

/// Observed cluster proxy settings; empty strings mean "not set"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyStatus {
    #[serde(default)]
    pub no_proxy: String,
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
}

/// `NO_PROXY`, `HTTP_PROXY` and `HTTPS_PROXY`, in that order, skipping unset values
pub fn proxy_env_vars(proxy: &ProxyStatus) -> Vec<EnvVar> {
    [
        ("NO_PROXY", &proxy.no_proxy),
        ("HTTP_PROXY", &proxy.http_proxy),
        ("HTTPS_PROXY", &proxy.https_proxy),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(name, value)| EnvVar {
        name: name.to_string(),
        value: Some(value.clone()),
        ..Default::default()
    })
    .collect()
}
