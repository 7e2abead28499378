use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid content key: {0}")]
    InvalidKey(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Caller-facing classification shared by every engine error.
///
/// The classification tells a caller whether to re-resolve and retry
/// (`Conflict`), fix the request (`BadRequest`), or give up (`NotFound`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A reference, commit, or content object is absent.
    NotFound,
    /// A reference CAS or per-key expected value did not match.
    Conflict,
    /// A reference with the requested name already exists.
    AlreadyExists,
    /// The request itself is malformed or cannot be satisfied.
    BadRequest,
    /// NORMAL-policy per-key divergence during merge or transplant.
    MergeConflict,
    /// Backend failure unrelated to the request.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not-found"),
            Self::Conflict => write!(f, "conflict"),
            Self::AlreadyExists => write!(f, "already-exists"),
            Self::BadRequest => write!(f, "bad-request"),
            Self::MergeConflict => write!(f, "merge-conflict"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
