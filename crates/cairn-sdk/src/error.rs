use thiserror::Error;

use cairn_types::ErrorKind;

#[derive(Debug, Error)]
pub enum VersionStoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Ref(#[from] cairn_refs::RefError),

    #[error(transparent)]
    Commit(#[from] cairn_commit::CommitError),

    #[error(transparent)]
    Log(#[from] cairn_log::LogError),

    #[error(transparent)]
    Merge(#[from] cairn_merge::MergeError),

    #[error(transparent)]
    Diff(#[from] cairn_diff::DiffError),

    #[error(transparent)]
    Dag(#[from] cairn_dag::DagError),

    #[error("store error: {0}")]
    Store(#[from] cairn_store::StoreError),
}

impl VersionStoreError {
    /// Category of the failure, for mapping onto client-facing statuses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::BadRequest,
            Self::Ref(e) => e.kind(),
            Self::Commit(e) => e.kind(),
            Self::Log(e) => e.kind(),
            Self::Merge(e) => e.kind(),
            Self::Diff(e) => e.kind(),
            Self::Dag(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    /// The merge result carried by a merge conflict.
    pub fn merge_result(&self) -> Option<&cairn_merge::MergeResult> {
        match self {
            Self::Merge(e) => e.merge_result(),
            _ => None,
        }
    }
}

pub type VersionStoreResult<T> = Result<T, VersionStoreError>;
