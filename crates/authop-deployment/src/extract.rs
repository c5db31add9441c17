//! Server argument extraction from the observed config.
//!
//! Each key under the server arguments path holds either a list of strings or
//! a single string. Anything else fails the whole extraction: a malformed
//! entry must surface instead of silently disappearing from the command line.

use authop_config::observed::kind_of;
use authop_config::{ConfigPath, ObservedConfig};
use serde_json::Value;

use crate::ExtractError;
use crate::args::ArgumentMap;
use crate::shell::shell_escape;

/// Read the server arguments stored at `path`, shell-escaping every value.
///
/// An absent subtree yields an empty map, same as an empty one.
pub fn extract_server_arguments(
    config: &ObservedConfig,
    path: &ConfigPath,
) -> Result<ArgumentMap, ExtractError> {
    let section = match config.get(path)? {
        None | Some(Value::Null) => return Ok(ArgumentMap::new()),
        Some(Value::Object(section)) => section,
        Some(other) => {
            return Err(ExtractError::MalformedSection {
                path: path.to_string(),
                found: kind_of(other),
            });
        }
    };

    let mut args = ArgumentMap::new();
    for (name, value) in section {
        let values = string_values(value).ok_or_else(|| ExtractError::MalformedValue {
            key: name.clone(),
            value: value.clone(),
        })?;
        let escaped = values
            .into_iter()
            .map(|value| shell_escape(value).into_owned())
            .collect();
        args.insert(name.clone(), escaped);
    }
    Ok(args)
}

/// A list of strings as-is, a single string as a one-element list
fn string_values(value: &Value) -> Option<Vec<&str>> {
    match value {
        Value::String(single) => Some(vec![single.as_str()]),
        Value::Array(items) => items.iter().map(Value::as_str).collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(value: Value) -> Result<ArgumentMap, ExtractError> {
        let config = ObservedConfig::from_value(json!({ "serverArguments": value })).unwrap();
        extract_server_arguments(&config, &ConfigPath::single("serverArguments"))
    }

    #[test]
    fn test_list_of_strings() {
        let args = extract(json!({ "scope": ["a", "b"] })).unwrap();
        assert_eq!(args.get("scope"), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn test_single_string() {
        let args = extract(json!({ "scope": "a" })).unwrap();
        assert_eq!(args.get("scope"), Some(&["a".to_string()][..]));
    }

    #[test]
    fn test_number_is_malformed() {
        let err = extract(json!({ "scope": 5 })).unwrap_err();
        match err {
            ExtractError::MalformedValue { key, value } => {
                assert_eq!(key, "scope");
                assert_eq!(value, json!(5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mixed_list_is_malformed() {
        let err = extract(json!({ "scope": ["a", 1] })).unwrap_err();
        assert!(err.to_string().contains("under scope key"));
    }

    #[test]
    fn test_values_are_escaped() {
        let args = extract(json!({ "banner": ["it's", "plain"], "empty": "" })).unwrap();
        assert_eq!(
            args.get("banner"),
            Some(&[r#"'it'"'"'s'"#.to_string(), "plain".to_string()][..])
        );
        assert_eq!(args.get("empty"), Some(&["''".to_string()][..]));
    }

    #[test]
    fn test_absent_and_empty_are_equivalent() {
        let absent = extract_server_arguments(
            &ObservedConfig::new(),
            &ConfigPath::single("serverArguments"),
        )
        .unwrap();
        let empty = extract(json!({})).unwrap();
        assert!(absent.is_empty());
        assert_eq!(absent, empty);
    }

    #[test]
    fn test_non_map_section_is_malformed() {
        let err = extract(json!(["--flag"])).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedSection { found: "a list", .. }));
    }
}
