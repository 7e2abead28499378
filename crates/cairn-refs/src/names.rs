//! Reference name validation following git-style conventions.
//!
//! Valid reference names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\` or `@`
//! - Must not contain `..` (double dot)
//! - Must not start or end with `.` or `/`
//! - Must not end with `.lock`
//! - Components between slashes must be non-empty and not start with `.`
//! - Must not be the reserved name `DETACHED` or look like a commit hash

use cairn_types::{Hash, DETACHED_REF_NAME};

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a reference name.
///
/// `@` separates a name from a hash in reference specs.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\', '@',
];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a branch or tag name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use cairn_refs::names::validate_reference_name;
///
/// assert!(validate_reference_name("main").is_ok());
/// assert!(validate_reference_name("feature/auth").is_ok());
/// assert!(validate_reference_name("").is_err());
/// assert!(validate_reference_name("bad..name").is_err());
/// ```
pub fn validate_reference_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "reference name must not be empty"));
    }
    if name == DETACHED_REF_NAME {
        return Err(invalid(name, "reserved name"));
    }
    if Hash::looks_like_hash(name) {
        return Err(invalid(name, "must not look like a commit hash"));
    }

    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control()) {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }

    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid(name, "must not start or end with '.'"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid(name, "must not start or end with '/'"));
    }
    if name.ends_with(".lock") {
        return Err(invalid(name, "must not end with '.lock'"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_simple_names() {
        assert!(validate_reference_name("main").is_ok());
        assert!(validate_reference_name("etl-2024").is_ok());
        assert!(validate_reference_name("v1.0").is_ok());
    }

    #[test]
    fn valid_nested_names() {
        assert!(validate_reference_name("feature/auth").is_ok());
        assert!(validate_reference_name("team/alice/fix-123").is_ok());
    }

    #[test]
    fn reject_empty_and_reserved() {
        assert!(validate_reference_name("").is_err());
        assert!(validate_reference_name("DETACHED").is_err());
        assert!(validate_reference_name(&"ab".repeat(32)).is_err());
    }

    #[test]
    fn reject_double_dot() {
        assert!(validate_reference_name("bad..name").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        for name in ["a b", "a\tb", "a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b", "a@b"] {
            assert!(validate_reference_name(name).is_err(), "{name} accepted");
        }
    }

    #[test]
    fn reject_boundaries() {
        assert!(validate_reference_name(".hidden").is_err());
        assert!(validate_reference_name("trailing.").is_err());
        assert!(validate_reference_name("/leading").is_err());
        assert!(validate_reference_name("trailing/").is_err());
        assert!(validate_reference_name("a//b").is_err());
        assert!(validate_reference_name("feature/.hidden").is_err());
    }

    #[test]
    fn reject_lock_suffix() {
        assert!(validate_reference_name("main.lock").is_err());
    }

    #[test]
    fn errors_are_bad_requests() {
        let err = validate_reference_name("a..b").unwrap_err();
        assert_eq!(err.kind(), cairn_types::ErrorKind::BadRequest);
    }
}
