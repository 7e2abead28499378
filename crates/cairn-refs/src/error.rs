//! Error types for reference operations.

use thiserror::Error;

use cairn_dag::DagError;
use cairn_store::StoreError;
use cairn_types::{ErrorKind, Hash, PredicateError};

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference name is invalid.
    #[error("invalid reference name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The reference spec could not be parsed.
    #[error("invalid reference spec {spec:?}: {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// The reference was not found.
    #[error("reference not found: {name}")]
    NotFound { name: String },

    /// A reference with this name already exists.
    #[error("reference already exists: {name}")]
    AlreadyExists { name: String },

    /// The reference did not point at the expected hash.
    #[error("reference {name} is at {}, expected {}", .actual.short_hex(), .expected.short_hex())]
    Conflict {
        name: String,
        expected: Hash,
        actual: Hash,
    },

    /// A hash named by the request does not exist.
    #[error("commit not found: {0}")]
    HashNotFound(Hash),

    /// Tags must be created pointing at an existing commit.
    #[error("tag {name} requires a target hash")]
    TagRequiresTarget { name: String },

    /// The default branch cannot be deleted.
    #[error("cannot delete the default branch: {name}")]
    DeleteDefaultBranch { name: String },

    /// A caller-supplied filter failed.
    #[error(transparent)]
    Filter(#[from] PredicateError),

    #[error(transparent)]
    Dag(#[from] DagError),

    /// Backend failure.
    #[error("storage error: {0}")]
    Store(#[source] StoreError),
}

impl RefError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. }
            | Self::InvalidSpec { .. }
            | Self::TagRequiresTarget { .. }
            | Self::DeleteDefaultBranch { .. }
            | Self::Filter(_) => ErrorKind::BadRequest,
            Self::NotFound { .. } | Self::HashNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Dag(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}

impl From<StoreError> for RefError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ReferenceNotFound(name) => Self::NotFound { name },
            StoreError::ReferenceAlreadyExists(name) => Self::AlreadyExists { name },
            StoreError::ReferenceConflict {
                name,
                expected,
                actual,
            } => Self::Conflict {
                name,
                expected,
                actual,
            },
            StoreError::CommitNotFound(hash) => Self::HashNotFound(hash),
            other => Self::Store(other),
        }
    }
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, RefError>;
