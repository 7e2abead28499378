use serde::{Deserialize, Serialize};

/// Per-key conflict resolution policy for merge and transplant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeBehavior {
    /// Apply only if the target did not change the key since the base.
    #[default]
    Normal,
    /// Apply unconditionally, overwriting target-side changes.
    Force,
    /// Exclude the key from the result.
    Drop,
}

impl std::fmt::Display for MergeBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Force => write!(f, "FORCE"),
            Self::Drop => write!(f, "DROP"),
        }
    }
}

/// Why a key could or could not be merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    /// The key merged cleanly.
    None,
    /// The key was skipped because its behavior is DROP.
    ExcludedByPolicy,
    /// Incoming put of a key the target created concurrently.
    KeyExists,
    /// Incoming change to a key the target deleted concurrently.
    KeyDoesNotExist,
    /// Incoming put of a key the target changed concurrently.
    ValueDiffers,
    /// Incoming delete of a key the target changed concurrently.
    UnresolvableDelete,
}

impl ConflictType {
    /// Returns `true` for target-side divergence.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::KeyExists | Self::KeyDoesNotExist | Self::ValueDiffers | Self::UnresolvableDelete
        )
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::ExcludedByPolicy => write!(f, "excluded by policy"),
            Self::KeyExists => write!(f, "key exists"),
            Self::KeyDoesNotExist => write!(f, "key does not exist"),
            Self::ValueDiffers => write!(f, "value differs"),
            Self::UnresolvableDelete => write!(f, "unresolvable delete"),
        }
    }
}
