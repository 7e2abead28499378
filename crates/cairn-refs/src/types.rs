use serde::{Deserialize, Serialize};

use cairn_types::{CommitMeta, Hash, Reference};

/// How a reference relates to the default branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMetadata {
    /// Metadata of the commit the reference points to, `None` at the root.
    pub head_meta: Option<CommitMeta>,
    /// Commits on the reference's first-parent chain.
    pub num_total_commits: usize,
    /// Nearest commit shared with the default branch.
    pub common_ancestor: Hash,
    /// Commits on the reference since the common ancestor.
    pub ahead: usize,
    /// Commits on the default branch since the common ancestor.
    pub behind: usize,
}

/// A reference together with its metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    pub reference: Reference,
    pub metadata: Option<ReferenceMetadata>,
}
