use serde::{Deserialize, Serialize};

use crate::content::Content;
use crate::key::ContentKey;

/// A single key-addressed mutation carried by a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Store `content` under `key`.
    ///
    /// When `expected` is set, the commit only succeeds if the content
    /// currently at `key` equals it.
    Put {
        key: ContentKey,
        content: Content,
        expected: Option<Content>,
    },
    /// Remove whatever is stored under `key`.
    Delete { key: ContentKey },
    /// Record that `key` was read but not changed. Has no effect on content.
    Unchanged { key: ContentKey },
}

impl Operation {
    /// Unconditional put.
    pub fn put(key: ContentKey, content: Content) -> Self {
        Self::Put {
            key,
            content,
            expected: None,
        }
    }

    /// Put guarded by the content currently expected at `key`.
    pub fn put_expecting(key: ContentKey, content: Content, expected: Content) -> Self {
        Self::Put {
            key,
            content,
            expected: Some(expected),
        }
    }

    pub fn delete(key: ContentKey) -> Self {
        Self::Delete { key }
    }

    pub fn unchanged(key: ContentKey) -> Self {
        Self::Unchanged { key }
    }

    /// The key this operation addresses.
    pub fn key(&self) -> &ContentKey {
        match self {
            Self::Put { key, .. } | Self::Delete { key } | Self::Unchanged { key } => key,
        }
    }

    /// Returns `true` for operations that change content (Put and Delete).
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }

    /// The content this operation leaves at its key, if it changes it:
    /// `Some(Some(c))` for a put, `Some(None)` for a delete, `None` otherwise.
    pub fn effect(&self) -> Option<Option<&Content>> {
        match self {
            Self::Put { content, .. } => Some(Some(content)),
            Self::Delete { .. } => Some(None),
            Self::Unchanged { .. } => None,
        }
    }

    /// Short label used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Put { .. } => "put",
            Self::Delete { .. } => "delete",
            Self::Unchanged { .. } => "unchanged",
        }
    }
}
