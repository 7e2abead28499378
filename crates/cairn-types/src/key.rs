//! Hierarchical content keys.
//!
//! A [`ContentKey`] is an ordered sequence of path elements, e.g.
//! `["warehouse", "sales", "orders"]`. Keys compare element-wise, so all keys
//! under one namespace sort next to each other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum number of elements in a key.
pub const MAX_ELEMENTS: usize = 20;

/// Maximum combined length of all elements in a key.
pub const MAX_LENGTH: usize = 500;

/// Element separator in the path rendering of a key.
const SEPARATOR: char = '.';

/// Stand-in for a literal `.` inside an element in the path rendering.
const ESCAPED_SEPARATOR: char = '\u{1D}';

/// Ordered sequence of path elements identifying one logical content object.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ContentKey {
    elements: Vec<String>,
}

impl ContentKey {
    /// Build a key from its elements.
    ///
    /// Fails if the key is empty, an element is empty or contains a NUL, or
    /// the key exceeds [`MAX_ELEMENTS`] / [`MAX_LENGTH`].
    pub fn new<I, S>(elements: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements: Vec<String> = elements.into_iter().map(Into::into).collect();
        if elements.is_empty() {
            return Err(TypeError::InvalidKey("key must have at least one element".into()));
        }
        if elements.len() > MAX_ELEMENTS {
            return Err(TypeError::InvalidKey(format!(
                "key has {} elements, maximum is {MAX_ELEMENTS}",
                elements.len()
            )));
        }
        let total: usize = elements.iter().map(String::len).sum();
        if total > MAX_LENGTH {
            return Err(TypeError::InvalidKey(format!(
                "key length {total} exceeds maximum {MAX_LENGTH}"
            )));
        }
        for element in &elements {
            if element.is_empty() {
                return Err(TypeError::InvalidKey("key elements must not be empty".into()));
            }
            if element.contains('\0') {
                return Err(TypeError::InvalidKey(format!(
                    "key element {element:?} contains NUL"
                )));
            }
        }
        Ok(Self { elements })
    }

    /// Convenience constructor for keys known to be valid (tests, literals).
    ///
    /// # Panics
    ///
    /// Panics if the elements do not form a valid key.
    pub fn of(elements: &[&str]) -> Self {
        Self::new(elements.iter().copied()).expect("invalid content key literal")
    }

    /// Parse the dotted path rendering produced by [`ContentKey::to_path_string`].
    pub fn from_path_string(path: &str) -> Result<Self, TypeError> {
        Self::new(
            path.split(SEPARATOR)
                .map(|e| e.replace(ESCAPED_SEPARATOR, ".")),
        )
    }

    /// Dotted path rendering; literal dots inside elements are escaped.
    pub fn to_path_string(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.replace(SEPARATOR, &ESCAPED_SEPARATOR.to_string()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The key's elements.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The last element (the object's own name).
    pub fn name(&self) -> &str {
        // Invariant: never empty.
        &self.elements[self.elements.len() - 1]
    }

    /// The enclosing namespace, or `None` for a top-level key.
    pub fn parent(&self) -> Option<ContentKey> {
        if self.elements.len() <= 1 {
            return None;
        }
        Some(Self {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    /// Returns `true` if `prefix`'s elements are a leading run of this key's.
    pub fn starts_with(&self, prefix: &ContentKey) -> bool {
        self.elements.starts_with(&prefix.elements)
    }

    /// The first `depth` elements of the key (the whole key if shorter).
    pub fn truncate(&self, depth: usize) -> ContentKey {
        let depth = depth.clamp(1, self.elements.len());
        Self {
            elements: self.elements[..depth].to_vec(),
        }
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", self.to_path_string())
    }
}

impl TryFrom<Vec<String>> for ContentKey {
    type Error = TypeError;

    fn try_from(elements: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(elements)
    }
}

impl From<ContentKey> for Vec<String> {
    fn from(key: ContentKey) -> Self {
        key.elements
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_validates_elements() {
        assert!(serde_json::from_str::<ContentKey>("[]").is_err());
        assert!(serde_json::from_str::<ContentKey>(r#"["a", ""]"#).is_err());

        let key: ContentKey = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(key, ContentKey::of(&["a", "b"]));
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn equality_is_element_wise() {
        assert_eq!(ContentKey::of(&["a", "b"]), ContentKey::of(&["a", "b"]));
        assert_ne!(ContentKey::of(&["a", "b"]), ContentKey::of(&["a.b"]));
    }

    #[test]
    fn rejects_empty_key_and_elements() {
        assert!(ContentKey::new(Vec::<String>::new()).is_err());
        assert!(ContentKey::new(["a", ""]).is_err());
        assert!(ContentKey::new(["a\0b"]).is_err());
    }

    #[test]
    fn rejects_oversized_keys() {
        let many: Vec<String> = (0..=MAX_ELEMENTS).map(|i| i.to_string()).collect();
        assert!(ContentKey::new(many).is_err());
        assert!(ContentKey::new(["x".repeat(MAX_LENGTH + 1)]).is_err());
    }

    #[test]
    fn path_string_escapes_dots() {
        let key = ContentKey::of(&["db", "a.b"]);
        let path = key.to_path_string();
        assert_eq!(path, "db.a\u{1D}b");
        assert_eq!(ContentKey::from_path_string(&path).unwrap(), key);
    }

    #[test]
    fn ordering_groups_namespaces() {
        let mut keys = vec![
            ContentKey::of(&["b"]),
            ContentKey::of(&["a", "z"]),
            ContentKey::of(&["a"]),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                ContentKey::of(&["a"]),
                ContentKey::of(&["a", "z"]),
                ContentKey::of(&["b"]),
            ]
        );
    }

    #[test]
    fn namespace_helpers() {
        let key = ContentKey::of(&["a", "b", "c"]);
        assert_eq!(key.name(), "c");
        assert_eq!(key.parent(), Some(ContentKey::of(&["a", "b"])));
        assert_eq!(ContentKey::of(&["a"]).parent(), None);
        assert!(key.starts_with(&ContentKey::of(&["a", "b"])));
        assert!(!key.starts_with(&ContentKey::of(&["b"])));
        assert_eq!(key.truncate(1), ContentKey::of(&["a"]));
        assert_eq!(key.truncate(10), key);
    }
}
