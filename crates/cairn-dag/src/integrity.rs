//! Chain integrity verification.
//!
//! Walks a history from its head and checks that every commit still hashes
//! to its identity and that every parent it names exists.

use serde::{Deserialize, Serialize};

use cairn_store::StoreError;
use cairn_types::Hash;

use crate::dag::CommitDag;
use crate::error::{DagError, DagResult};

/// Outcome of a successful verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Where the walk started.
    pub head: Hash,
    /// Number of commits verified.
    pub commits_checked: usize,
}

impl CommitDag {
    /// Verify the first-parent chain of `head` down to the root.
    pub fn verify_chain(&self, head: Hash) -> DagResult<IntegrityReport> {
        let mut checked = 0usize;
        let mut previous: Option<Hash> = None;

        for commit in self.commits(head) {
            let commit = match commit {
                Ok(commit) => commit,
                Err(StoreError::CommitNotFound(missing)) => {
                    return Err(match previous {
                        Some(child) => DagError::BrokenChain {
                            commit: child,
                            reason: format!("parent {} is missing", missing.short_hex()),
                        },
                        None => DagError::CommitNotFound(missing),
                    });
                }
                Err(e) => return Err(e.into()),
            };

            if !commit.verify_hash()? {
                return Err(DagError::BrokenChain {
                    commit: commit.hash,
                    reason: "content does not match hash".into(),
                });
            }
            for extra in &commit.additional_parents {
                if !self.graph().contains_commit(extra)? {
                    return Err(DagError::BrokenChain {
                        commit: commit.hash,
                        reason: format!("additional parent {} is missing", extra.short_hex()),
                    });
                }
            }

            previous = Some(commit.hash);
            checked += 1;
        }

        tracing::debug!(head = %head.short_hex(), commits = checked, "verified chain");
        Ok(IntegrityReport {
            head,
            commits_checked: checked,
        })
    }
}
