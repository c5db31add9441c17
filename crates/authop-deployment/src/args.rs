//! Server argument model and flag rendering

use std::collections::BTreeMap;

/// Separator between rendered flags: a shell line continuation
pub const FLAG_SEPARATOR: &str = " \\\n";

/// Server arguments by name.
///
/// Values keep the order they were declared in; names always render in
/// byte-wise lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap(BTreeMap<String, Vec<String>>);

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values of `name`, replacing earlier ones
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.0.insert(name.into(), values);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// One `--name=value` flag per value, sorted by name.
    ///
    /// Values are emitted as stored; they are expected to be shell-escaped
    /// already.
    pub fn to_flags(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |value| format!("--{name}={value}")))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for ArgumentMap {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Join rendered flags with line continuations, without a trailing one
pub fn join_flags<S: AsRef<str>>(flags: &[S]) -> String {
    flags
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(FLAG_SEPARATOR)
}
