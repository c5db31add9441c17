//! Observed configuration tree
//!
//! The persisted observed config is a JSON object whose shape is only known to
//! the observers that write it. Each observer owns one or more fixed paths and
//! only ever sets, removes or prunes under those; everything else in the tree
//! is left as it was.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ConfigError, Result};

/// Path into an observed config, one segment per nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Single-segment path, e.g. `serverArguments`
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn split(&self) -> Result<(&[String], &String)> {
        match self.0.split_last() {
            Some((last, parents)) => Ok((parents, last)),
            None => Err(ConfigError::EmptyPath),
        }
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Loosely-typed observed configuration.
///
/// Values are plain JSON; "absent" is expressed as `None` from [`get`](Self::get),
/// never as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservedConfig(Map<String, Value>);

impl ObservedConfig {
    /// Create an empty observed config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value. `null` is treated as an empty config.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ConfigError::parse(format!(
                "observed config must be an object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Decode the persisted raw form. An empty blob is an empty config.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| ConfigError::parse(format!("JSON parse error: {e}")))?;
        Self::from_value(value)
    }

    /// Encode into the persisted raw form
    pub fn to_raw(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0)
            .map_err(|e| ConfigError::parse(format!("JSON encode error: {e}")))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the value at `path`.
    ///
    /// Returns `Ok(None)` when any segment is missing and an error when an
    /// intermediate segment holds something other than a map.
    pub fn get(&self, path: &ConfigPath) -> Result<Option<&Value>> {
        let (parents, last) = path.split()?;
        let mut current = &self.0;
        for segment in parents {
            match current.get(segment) {
                None => return Ok(None),
                Some(Value::Object(map)) => current = map,
                Some(other) => return Err(not_a_map(path, segment, other)),
            }
        }
        Ok(current.get(last))
    }

    /// Set `value` at `path`, creating intermediate maps as needed.
    pub fn set(&mut self, path: &ConfigPath, value: Value) -> Result<()> {
        let (parents, last) = path.split()?;
        let mut current = &mut self.0;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match entry {
                Value::Object(map) => map,
                other => return Err(not_a_map(path, segment, other)),
            };
        }
        current.insert(last.clone(), value);
        Ok(())
    }

    /// Remove and return the value at `path`
    pub fn remove(&mut self, path: &ConfigPath) -> Result<Option<Value>> {
        let (parents, last) = path.split()?;
        let mut current = &mut self.0;
        for segment in parents {
            current = match current.get_mut(segment) {
                None => return Ok(None),
                Some(Value::Object(map)) => map,
                Some(other) => return Err(not_a_map(path, segment, other)),
            };
        }
        Ok(current.remove(last))
    }

    /// Copy of this config containing only the given paths.
    ///
    /// Paths that are absent or unreachable are skipped.
    pub fn pruned(&self, paths: &[ConfigPath]) -> Self {
        let mut pruned = Self::new();
        for path in paths {
            if let Ok(Some(value)) = self.get(path) {
                // Every prefix of `path` was a map in `self`, so it is one here too.
                let _ = pruned.set(path, value.clone());
            }
        }
        pruned
    }

    /// Deep merge `other` into this config; `other` wins on conflicts.
    pub fn merge(&mut self, other: ObservedConfig) {
        for (key, value) in other.0 {
            match self.0.get_mut(&key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.0.insert(key, value);
                }
            }
        }
    }

    /// Copy of this config with `owned_paths` replaced by `overlay`.
    ///
    /// Owned paths are cleared first, so a path missing from the overlay ends
    /// up absent. Everything outside the owned paths is kept as is.
    pub fn with_overlay(
        &self,
        owned_paths: &[ConfigPath],
        overlay: ObservedConfig,
    ) -> Result<Self> {
        let mut updated = self.clone();
        for path in owned_paths {
            updated.remove(path)?;
        }
        updated.merge(overlay);
        Ok(updated)
    }

    /// The sub-tree stored under `key`, e.g. the `oauthServer` section of the
    /// operator's observed config. A missing section is empty.
    pub fn section(&self, key: &str) -> Result<ObservedConfig> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(Value::Object(map)) => Ok(Self(map.clone())),
            Some(other) => Err(ConfigError::NotAMap {
                path: key.to_string(),
                segment: key.to_string(),
                found: kind_of(other),
            }),
        }
    }

    /// Replace the sub-tree under `key` with `section`
    pub fn set_section(&mut self, key: &str, section: ObservedConfig) {
        self.0.insert(key.to_string(), section.into_value());
    }
}

impl From<Map<String, Value>> for ObservedConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Deep merge two JSON values (right takes precedence for conflicts)
fn deep_merge(left: &mut Value, right: Value) {
    match (left, right) {
        (Value::Object(left_map), Value::Object(right_map)) => {
            for (key, right_value) in right_map {
                if let Some(left_value) = left_map.get_mut(&key) {
                    deep_merge(left_value, right_value);
                } else {
                    left_map.insert(key, right_value);
                }
            }
        }
        (left, right) => {
            *left = right;
        }
    }
}

fn not_a_map(path: &ConfigPath, segment: &str, found: &Value) -> ConfigError {
    ConfigError::NotAMap {
        path: path.to_string(),
        segment: segment.to_string(),
        found: kind_of(found),
    }
}

/// Short name of a JSON value's type, for error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
