//! Rollout hash over tracked resource versions.
//!
//! Changes in resources whose content never lands in the manifest (secrets,
//! config maps, ...) still have to restart the pods. Their resource versions
//! are folded into one digest that is written into the pod template.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha512};
use tracing::debug;

/// Hash of the sorted, comma-joined versions.
///
/// SHA-512 encoded as unpadded URL-safe base64. Independent of the order the
/// versions are supplied in.
pub fn rollout_hash<I, S>(versions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut versions: Vec<S> = versions.into_iter().collect();
    versions.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
    let joined = versions
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(",");
    debug!(tracked_versions = %joined, "computing rollout hash");

    let mut hasher = Sha512::new();
    hasher.update(joined.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
