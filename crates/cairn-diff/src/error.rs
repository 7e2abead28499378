//! Error types for the diff crate.

use cairn_store::StoreError;
use cairn_types::{ErrorKind, PredicateError};

/// Errors that can occur while comparing or listing content.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The caller's entry filter failed to evaluate.
    #[error(transparent)]
    Filter(#[from] PredicateError),

    /// Store operation failed (including unknown commits).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DiffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Filter(_) => ErrorKind::BadRequest,
            Self::Store(e) => e.kind(),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
