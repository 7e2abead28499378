//! Commits onto a branch head.
//!
//! A commit is accepted in four steps: the branch head is checked against
//! the caller's expectation, per-key expected contents are checked against
//! the head, the commit is appended, and the branch is moved by
//! compare-and-swap. The engine never retries; a lost race surfaces as
//! [`CommitError::ReferenceConflict`] and the caller re-reads and tries again.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use cairn_refs::ReferenceManager;
use cairn_store::{ScopedGraph, StoreError};
use cairn_types::{CommitDraft, CommitMeta, Hash, NamedRef, Operation, Reference};

use crate::error::{CommitError, Result};

/// Appends caller-supplied operations to branches.
#[derive(Clone, Debug)]
pub struct CommitEngine {
    graph: ScopedGraph,
    refs: ReferenceManager,
    committer: String,
}

impl CommitEngine {
    pub fn new(graph: ScopedGraph, refs: ReferenceManager, committer: impl Into<String>) -> Self {
        Self {
            graph,
            refs,
            committer: committer.into(),
        }
    }

    /// Commit `operations` on top of `branch`.
    ///
    /// When `expected` is given the branch must currently point at it.
    /// Returns the branch at its new head.
    pub fn commit(
        &self,
        branch: &str,
        expected: Option<Hash>,
        operations: Vec<Operation>,
        meta: CommitMeta,
    ) -> Result<Reference> {
        let head = self.refs.get_branch(branch)?.hash;
        if let Some(expected) = expected {
            if expected != head {
                return Err(CommitError::ReferenceConflict {
                    branch: branch.to_string(),
                    expected,
                    actual: head,
                });
            }
        }

        if meta.committer.is_some() {
            return Err(CommitError::CommitterSet);
        }
        validate_operations(&operations)?;
        self.check_expected_contents(head, &operations)?;

        let meta = meta.stamped(&self.committer, Utc::now());
        let commit = self
            .graph
            .append_commit(CommitDraft::new(head, meta, operations))?;

        let named_ref = NamedRef::branch(branch);
        match self.graph.cas_reference(&named_ref, head, commit.hash) {
            Ok(()) => {}
            Err(StoreError::ReferenceConflict { actual, .. }) => {
                warn!(
                    branch,
                    expected = %head.short_hex(),
                    actual = %actual.short_hex(),
                    "lost commit race"
                );
                return Err(CommitError::ReferenceConflict {
                    branch: branch.to_string(),
                    expected: head,
                    actual,
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            branch,
            commit = %commit.hash.short_hex(),
            parent = %head.short_hex(),
            ops = commit.operations.len(),
            "committed"
        );
        Ok(Reference::new(named_ref, commit.hash))
    }

    fn check_expected_contents(&self, head: Hash, operations: &[Operation]) -> Result<()> {
        for op in operations {
            let Operation::Put {
                key,
                expected: Some(expected),
                ..
            } = op
            else {
                continue;
            };
            let current = self.graph.get_content_at(&head, key)?;
            debug!(key = %key, present = current.is_some(), "checking expected content");
            match current {
                Some(current) if &current == expected => {}
                Some(_) => {
                    return Err(CommitError::ContentConflict {
                        key: key.clone(),
                        reason: "content differs from expected".into(),
                    })
                }
                None => {
                    return Err(CommitError::ContentConflict {
                        key: key.clone(),
                        reason: "key does not exist".into(),
                    })
                }
            }
        }
        Ok(())
    }
}

fn validate_operations(operations: &[Operation]) -> Result<()> {
    if operations.is_empty() {
        return Err(CommitError::EmptyOperations);
    }
    let mut seen = HashSet::with_capacity(operations.len());
    for op in operations {
        debug!(key = %op.key(), op = op.kind_name(), "staged operation");
        if !seen.insert(op.key()) {
            return Err(CommitError::DuplicateKey(op.key().clone()));
        }
    }
    Ok(())
}
