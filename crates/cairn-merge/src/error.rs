use cairn_dag::DagError;
use cairn_refs::RefError;
use cairn_store::StoreError;
use cairn_types::{ErrorKind, Hash};

use crate::types::MergeResult;

/// Errors from merge and transplant.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The target branch is not where the caller expected, or moved while the
    /// result was being written.
    #[error("branch {branch} is at {}, expected {}", .actual.short_hex(), .expected.short_hex())]
    ReferenceConflict {
        branch: String,
        expected: Hash,
        actual: Hash,
    },

    /// At least one key under NORMAL behavior diverged on the target.
    #[error("merge conflict on {} key(s)", .0.conflicts().count())]
    Conflict(Box<MergeResult>),

    #[error("no commits to transplant")]
    EmptyTransplant,

    /// A transplanted hash does not exist.
    #[error("commit to transplant not found: {0}")]
    UnknownCommit(Hash),

    /// Transplanted commits must form a parent chain in the given order.
    #[error("commit {} does not follow {}", .hash.short_hex(), .expected_parent.short_hex())]
    NonContiguous { hash: Hash, expected_parent: Hash },

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Dag(#[from] DagError),

    #[error("storage error: {0}")]
    Store(#[source] StoreError),
}

impl MergeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReferenceConflict { .. } => ErrorKind::Conflict,
            Self::Conflict(_) => ErrorKind::MergeConflict,
            Self::EmptyTransplant | Self::UnknownCommit(_) | Self::NonContiguous { .. } => {
                ErrorKind::BadRequest
            }
            Self::Ref(e) => e.kind(),
            Self::Dag(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    /// The populated result carried by a merge conflict.
    pub fn merge_result(&self) -> Option<&MergeResult> {
        match self {
            Self::Conflict(result) => Some(result),
            _ => None,
        }
    }
}

impl From<StoreError> for MergeError {
    fn from(err: StoreError) -> Self {
        Self::Ref(RefError::from(err))
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
