use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cairn_types::{ConflictType, ContentKey, Hash, MergeBehavior};

/// Knobs shared by merge and transplant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Replay each source commit separately instead of one squashed commit.
    pub keep_individual_commits: bool,
    /// Per-key behavior overrides.
    pub key_behaviors: BTreeMap<ContentKey, MergeBehavior>,
    /// Behavior for keys without an override.
    pub default_behavior: MergeBehavior,
    /// Compute the result without writing anything.
    pub dry_run: bool,
    /// Report conflicts in the result instead of failing.
    pub return_conflict_as_result: bool,
    /// Message of the squashed commit; generated when absent.
    pub message: Option<String>,
    /// Fill per-key and target-side commit lists.
    pub fetch_additional_info: bool,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_individual_commits(mut self, keep: bool) -> Self {
        self.keep_individual_commits = keep;
        self
    }

    pub fn key_behavior(mut self, key: ContentKey, behavior: MergeBehavior) -> Self {
        self.key_behaviors.insert(key, behavior);
        self
    }

    pub fn default_behavior(mut self, behavior: MergeBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn return_conflict_as_result(mut self, enabled: bool) -> Self {
        self.return_conflict_as_result = enabled;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn fetch_additional_info(mut self, enabled: bool) -> Self {
        self.fetch_additional_info = enabled;
        self
    }

    /// Behavior that applies to `key`.
    pub fn behavior_for(&self, key: &ContentKey) -> MergeBehavior {
        self.key_behaviors
            .get(key)
            .copied()
            .unwrap_or(self.default_behavior)
    }
}

/// Outcome for a single key touched by the source commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDetails {
    pub key: ContentKey,
    pub merge_behavior: MergeBehavior,
    pub conflict_type: ConflictType,
    /// Source commits touching the key (with additional info only).
    pub source_commits: Vec<Hash>,
    /// Target commits since the base touching the key (with additional info
    /// only).
    pub target_commits: Vec<Hash>,
}

impl KeyDetails {
    /// Returns `true` if this key blocks the merge.
    pub fn is_blocking(&self) -> bool {
        self.merge_behavior == MergeBehavior::Normal && self.conflict_type.is_conflict()
    }
}

/// Outcome of a merge or transplant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub target_branch: String,
    /// The hash the caller expected the target at, if given.
    pub expected_hash: Option<Hash>,
    /// The target head the result was computed against.
    pub effective_target_hash: Hash,
    /// The target head after the operation; equals the effective hash when
    /// nothing was written.
    pub resultant_target_hash: Hash,
    /// The merge base; `None` for transplants.
    pub common_ancestor: Option<Hash>,
    pub was_applied: bool,
    pub was_successful: bool,
    /// Replayed source commits, oldest first.
    pub source_commits: Vec<Hash>,
    /// Target commits since the base, oldest first (with additional info
    /// only).
    pub target_commits: Vec<Hash>,
    pub details: Vec<KeyDetails>,
}

impl MergeResult {
    /// Details that block the merge.
    pub fn conflicts(&self) -> impl Iterator<Item = &KeyDetails> {
        self.details.iter().filter(|d| d.is_blocking())
    }

    /// Details for `key`, if the source touched it.
    pub fn details_for(&self, key: &ContentKey) -> Option<&KeyDetails> {
        self.details.iter().find(|d| &d.key == key)
    }
}
