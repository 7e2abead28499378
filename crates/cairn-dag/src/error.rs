//! Error types for commit ancestry operations.

use cairn_store::StoreError;
use cairn_types::{ErrorKind, Hash, TypeError};

/// Errors that can occur while traversing the commit graph.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A commit on the walked chain does not exist.
    #[error("commit not found: {0}")]
    CommitNotFound(Hash),

    /// An ancestry walk visited more commits than allowed.
    #[error("ancestry walk exceeded {limit} commits")]
    WalkLimitExceeded { limit: usize },

    /// Two histories share no commit, not even the root.
    #[error("no common ancestor between {a} and {b}")]
    NoCommonAncestor { a: Hash, b: Hash },

    /// `ancestor` is not on the first-parent chain of `descendant`.
    #[error("{ancestor} is not an ancestor of {descendant}")]
    NotAncestor { ancestor: Hash, descendant: Hash },

    /// A commit failed verification.
    #[error("broken chain at {commit}: {reason}")]
    BrokenChain { commit: Hash, reason: String },

    /// A commit could not be re-hashed.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TypeError> for DagError {
    fn from(err: TypeError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl DagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CommitNotFound(_) => ErrorKind::NotFound,
            Self::WalkLimitExceeded { .. }
            | Self::NoCommonAncestor { .. }
            | Self::NotAncestor { .. } => ErrorKind::BadRequest,
            Self::BrokenChain { .. } | Self::Serialization(_) => ErrorKind::Internal,
            Self::Store(e) => e.kind(),
        }
    }
}

/// Convenience alias for ancestry results.
pub type DagResult<T> = Result<T, DagError>;
