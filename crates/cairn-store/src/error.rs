use cairn_types::{ErrorKind, Hash, TypeError};

/// Errors from commit graph operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No reference with this name exists (or it has a different type).
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// A reference with this name already exists.
    #[error("reference already exists: {0}")]
    ReferenceAlreadyExists(String),

    /// The reference did not point at the expected hash.
    #[error("reference {name} is at {actual}, expected {expected}")]
    ReferenceConflict {
        name: String,
        expected: Hash,
        actual: Hash,
    },

    /// The requested commit does not exist in this repository.
    #[error("commit not found: {0}")]
    CommitNotFound(Hash),

    /// The reference cannot be stored (e.g. the detached pseudo-reference).
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Serialization or hashing failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend failure unrelated to the request.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReferenceNotFound(_) | Self::CommitNotFound(_) => ErrorKind::NotFound,
            Self::ReferenceAlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::ReferenceConflict { .. } => ErrorKind::Conflict,
            Self::InvalidReference(_) => ErrorKind::BadRequest,
            Self::Serialization(_) | Self::Backend(_) => ErrorKind::Internal,
        }
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for commit graph operations.
pub type StoreResult<T> = Result<T, StoreError>;
