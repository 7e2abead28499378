use cairn_refs::RefError;
use cairn_store::StoreError;
use cairn_types::{ContentKey, ErrorKind, Hash};

/// Errors from committing to a branch.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The branch is not at the hash the caller expected, or moved while the
    /// commit was being written.
    #[error("branch {branch} is at {}, expected {}", .actual.short_hex(), .expected.short_hex())]
    ReferenceConflict {
        branch: String,
        expected: Hash,
        actual: Hash,
    },

    /// The content at `key` differs from the caller's expected content.
    #[error("content conflict on {key}: {reason}")]
    ContentConflict { key: ContentKey, reason: String },

    /// The committer is assigned by the server.
    #[error("cannot set the committer on the client side; it is set by the server")]
    CommitterSet,

    #[error("a commit must contain at least one operation")]
    EmptyOperations,

    #[error("key {0} appears more than once in the commit")]
    DuplicateKey(ContentKey),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error("storage error: {0}")]
    Store(#[source] StoreError),
}

impl CommitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReferenceConflict { .. } | Self::ContentConflict { .. } => ErrorKind::Conflict,
            Self::CommitterSet | Self::EmptyOperations | Self::DuplicateKey(_) => {
                ErrorKind::BadRequest
            }
            Self::Ref(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}

impl From<StoreError> for CommitError {
    fn from(err: StoreError) -> Self {
        Self::Ref(RefError::from(err))
    }
}

pub type Result<T> = std::result::Result<T, CommitError>;
