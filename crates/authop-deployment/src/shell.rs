//! Shell-safe quoting of single command line tokens.
//!
//! Rendered server arguments end up in a shell-invoked entrypoint, so every
//! value is quoted with POSIX single-quote semantics before it is emitted.

use std::borrow::Cow;
use std::sync::LazyLock;

/// Anything outside `[A-Za-z0-9_@%+=:,./-]` needs quoting
static UNSAFE_CHAR_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"[^A-Za-z0-9_@%+=:,./-]").expect("Invalid shell escape regex")
});

/// Returns a version of `token` that a POSIX shell reads back as exactly one
/// word with the original contents.
///
/// - empty input becomes `''`
/// - tokens made of safe characters only are returned unchanged
/// - everything else is wrapped in single quotes, with each embedded `'`
///   written as `'"'"'`
pub fn shell_escape(token: &str) -> Cow<'_, str> {
    if token.is_empty() {
        return Cow::Borrowed("''");
    }
    if UNSAFE_CHAR_REGEX.is_match(token) {
        return Cow::Owned(format!("'{}'", token.replace('\'', r#"'"'"'"#)));
    }
    Cow::Borrowed(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_token() {
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_safe_tokens_unchanged() {
        for token in [
            "json",
            "/var/log/oauth-server/audit.log",
            "user@example.com",
            "a=b,c:d",
            "100%",
            "x+y_z.-",
        ] {
            assert!(matches!(shell_escape(token), Cow::Borrowed(t) if t == token));
        }
    }

    #[test]
    fn test_embedded_single_quote() {
        assert_eq!(shell_escape("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn test_metacharacters_are_quoted() {
        assert_eq!(shell_escape("a b"), "'a b'");
        assert_eq!(shell_escape("$HOME"), "'$HOME'");
        assert_eq!(shell_escape("`id`"), "'`id`'");
        assert_eq!(shell_escape("a\nb"), "'a\nb'");
        assert_eq!(shell_escape("héllo"), "'héllo'");
    }

    proptest! {
        #[test]
        fn safe_charset_is_identity(token in "[A-Za-z0-9_@%+=:,./-]{1,64}") {
            prop_assert_eq!(shell_escape(&token), token.as_str());
        }

        #[test]
        fn quoted_tokens_are_wrapped(token in ".*[ '$\"`;&|].*") {
            let escaped = shell_escape(&token);
            prop_assert!(escaped.starts_with('\''));
            prop_assert!(escaped.ends_with('\''));
        }
    }
}
