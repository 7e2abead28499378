use cairn_store::StoreError;
use cairn_types::{ErrorKind, Hash, PredicateError};

/// Errors from reading the commit log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The walk was asked to start at an unknown commit.
    #[error("commit not found: {0}")]
    StartNotFound(Hash),

    /// The page token names an unknown commit.
    #[error("page token not found: {0}")]
    PageTokenNotFound(Hash),

    /// The caller's filter failed to evaluate.
    #[error(transparent)]
    Filter(#[from] PredicateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StartNotFound(_) | Self::PageTokenNotFound(_) => ErrorKind::NotFound,
            Self::Filter(_) => ErrorKind::BadRequest,
            Self::Store(e) => e.kind(),
        }
    }
}

pub type LogResult<T> = Result<T, LogError>;
