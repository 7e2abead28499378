use serde::{Deserialize, Serialize};

use cairn_log::MAX_LOG_ENTRIES;
use cairn_refs::validate_reference_name;
use cairn_types::MergeBehavior;

use crate::error::{VersionStoreError, VersionStoreResult};

/// Settings of one [`VersionStore`](crate::VersionStore).
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```toml
/// default_branch = "trunk"
/// max_log_entries = 100
/// default_merge_behavior = "FORCE"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionStoreConfig {
    /// Branch created by `init` and used as the base for reference metadata.
    pub default_branch: String,
    /// Server-side cap on log page size.
    pub max_log_entries: usize,
    /// Per-side commit limit of common-ancestor walks.
    pub max_ancestor_walk: usize,
    /// Behavior for keys without an override in merge options built by
    /// [`VersionStore::merge_options`](crate::VersionStore::merge_options).
    pub default_merge_behavior: MergeBehavior,
    /// Name stamped as committer on every commit the store writes.
    pub committer: String,
}

impl Default for VersionStoreConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".into(),
            max_log_entries: MAX_LOG_ENTRIES,
            max_ancestor_walk: 10_000,
            default_merge_behavior: MergeBehavior::Normal,
            committer: "cairn".into(),
        }
    }
}

impl VersionStoreConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> VersionStoreResult<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| VersionStoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VersionStoreResult<()> {
        validate_reference_name(&self.default_branch).map_err(|e| {
            VersionStoreError::Config(format!("default_branch: {e}"))
        })?;
        if self.max_log_entries == 0 {
            return Err(VersionStoreError::Config(
                "max_log_entries must be greater than zero".into(),
            ));
        }
        if self.max_ancestor_walk == 0 {
            return Err(VersionStoreError::Config(
                "max_ancestor_walk must be greater than zero".into(),
            ));
        }
        if self.committer.trim().is_empty() {
            return Err(VersionStoreError::Config("committer must not be empty".into()));
        }
        Ok(())
    }
}
