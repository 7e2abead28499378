//! Commits and their metadata.
//!
//! A [`Commit`] is immutable once persisted. Its hash is derived from its
//! content (parent linkage, metadata and operations) through
//! [`ContentHasher::COMMIT`], so a commit can never be changed without
//! changing its identity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::Hash;
use crate::hasher::ContentHasher;
use crate::operation::Operation;

/// Property set on merge and transplant commits naming the merged source hash.
pub const MERGE_PARENT_PROPERTY: &str = "_merge_parent";

/// Descriptive metadata of a commit.
///
/// `committer` and `commit_time` are assigned by the server when the commit
/// is persisted; callers only supply the message, author and properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub message: String,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub author_time: Option<DateTime<Utc>>,
    pub commit_time: Option<DateTime<Utc>>,
    pub properties: BTreeMap<String, String>,
}

impl CommitMeta {
    /// Metadata carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Stamp server-side fields: the committer and the commit time. The
    /// author defaults to the committer and the author time to the commit
    /// time when the caller left them unset.
    pub fn stamped(mut self, committer: &str, now: DateTime<Utc>) -> Self {
        self.committer = Some(committer.to_string());
        self.commit_time = Some(now);
        if self.author.is_none() {
            self.author = Some(committer.to_string());
        }
        if self.author_time.is_none() {
            self.author_time = Some(now);
        }
        self
    }
}

/// A commit that has not been persisted yet.
///
/// The commit graph turns a draft into a [`Commit`] by computing its hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDraft {
    pub parent: Hash,
    pub additional_parents: Vec<Hash>,
    pub meta: CommitMeta,
    pub operations: Vec<Operation>,
}

impl CommitDraft {
    pub fn new(parent: Hash, meta: CommitMeta, operations: Vec<Operation>) -> Self {
        Self {
            parent,
            additional_parents: Vec::new(),
            meta,
            operations,
        }
    }

    pub fn with_additional_parent(mut self, parent: Hash) -> Self {
        self.additional_parents.push(parent);
        self
    }

    /// The content-derived hash this draft will be persisted under.
    pub fn compute_hash(&self) -> Result<Hash, TypeError> {
        ContentHasher::COMMIT.hash_json(self)
    }

    /// Seal the draft into an immutable commit.
    pub fn into_commit(self) -> Result<Commit, TypeError> {
        let hash = self.compute_hash()?;
        Ok(Commit {
            hash,
            parent: self.parent,
            additional_parents: self.additional_parents,
            meta: self.meta,
            operations: self.operations,
        })
    }
}

/// An immutable node of the commit graph.
///
/// `additional_parents` is informational (merge sources); history walks only
/// follow `parent`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: Hash,
    pub parent: Hash,
    pub additional_parents: Vec<Hash>,
    pub meta: CommitMeta,
    pub operations: Vec<Operation>,
}

impl Commit {
    /// Returns `true` if this commit sits directly on the root state.
    pub fn is_first(&self) -> bool {
        self.parent.is_no_ancestor()
    }

    /// Operations that change content (Unchanged removed).
    pub fn mutations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.is_mutation())
    }

    /// Recompute the hash from the commit's fields.
    pub fn verify_hash(&self) -> Result<bool, TypeError> {
        let draft = CommitDraft {
            parent: self.parent,
            additional_parents: self.additional_parents.clone(),
            meta: self.meta.clone(),
            operations: self.operations.clone(),
        };
        Ok(draft.compute_hash()? == self.hash)
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        let first_line = self.meta.message.lines().next().unwrap_or("");
        format!("{} {}", self.hash.short_hex(), first_line)
    }
}
