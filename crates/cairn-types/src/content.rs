//! Content objects stored under content keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier of a logical content object (UUID v7).
///
/// The id survives updates and renames: a `Put` that replaces an existing
/// object keeps its id, while the key it lives under may change.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(uuid::Uuid);

impl ContentId {
    /// Generate a new time-ordered content id.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short_id())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of object a [`Content`] describes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    IcebergTable,
    IcebergView,
    DeltaLakeTable,
    Namespace,
    UdfFunction,
    /// Application-defined type name.
    Custom(String),
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IcebergTable => write!(f, "ICEBERG_TABLE"),
            Self::IcebergView => write!(f, "ICEBERG_VIEW"),
            Self::DeltaLakeTable => write!(f, "DELTA_LAKE_TABLE"),
            Self::Namespace => write!(f, "NAMESPACE"),
            Self::UdfFunction => write!(f, "UDF"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Opaque, typed payload stored under a key at a commit.
///
/// The store never interprets `payload`; equality is structural over all
/// three fields, which is what per-key expected-value checks and merge
/// conflict detection compare.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub content_type: ContentType,
    pub payload: Value,
}

impl Content {
    /// New content object with a freshly generated id.
    pub fn new(content_type: ContentType, payload: Value) -> Self {
        Self {
            id: ContentId::new(),
            content_type,
            payload,
        }
    }

    /// New content object with an explicit id.
    pub fn with_id(id: ContentId, content_type: ContentType, payload: Value) -> Self {
        Self {
            id,
            content_type,
            payload,
        }
    }

    /// A new revision of the same logical object carrying `payload`.
    pub fn updated(&self, payload: Value) -> Self {
        Self {
            id: self.id.clone(),
            content_type: self.content_type.clone(),
            payload,
        }
    }
}
