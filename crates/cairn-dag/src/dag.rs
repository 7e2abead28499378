//! Ancestry queries over a repository's commit graph.
//!
//! Every walk follows first parents only and reads commits lazily from the
//! backend. Walks that search for an intersection are bounded by
//! `max_walk` commits per side.

use std::collections::HashSet;

use tracing::debug;

use cairn_store::{CommitIter, ScopedGraph};
use cairn_types::{Commit, Hash};

use crate::error::{DagError, DagResult};

/// Lazy hash chain: the start commit, its parent, ..., ending with
/// [`Hash::NO_ANCESTOR`].
pub struct HashChain<'a> {
    commits: CommitIter<'a>,
    done: bool,
}

impl Iterator for HashChain<'_> {
    type Item = DagResult<Hash>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.commits.next() {
            Some(Ok(commit)) => Some(Ok(commit.hash)),
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            None => {
                self.done = true;
                Some(Ok(Hash::NO_ANCESTOR))
            }
        }
    }
}

/// Ancestry operations bound to one repository.
#[derive(Clone, Debug)]
pub struct CommitDag {
    graph: ScopedGraph,
    max_walk: usize,
}

impl CommitDag {
    /// `max_walk` bounds how many commits an intersection search may visit
    /// on each side.
    pub fn new(graph: ScopedGraph, max_walk: usize) -> Self {
        Self { graph, max_walk }
    }

    pub fn graph(&self) -> &ScopedGraph {
        &self.graph
    }

    pub fn max_walk(&self) -> usize {
        self.max_walk
    }

    /// Lazy commit walk from `start` (inclusive) to the first commit.
    pub fn commits(&self, start: Hash) -> CommitIter<'_> {
        self.graph.walk_ancestry(start)
    }

    /// Lazy hash chain from `start`; see [`HashChain`].
    pub fn hash_chain(&self, start: Hash) -> HashChain<'_> {
        HashChain {
            commits: self.graph.walk_ancestry(start),
            done: false,
        }
    }

    /// Find the nearest commit shared by the histories of `a` and `b`.
    ///
    /// Both chains are stepped alternately and the first hash seen on both
    /// sides wins. `NO_ANCESTOR` terminates every chain, so unrelated
    /// histories meet there.
    pub fn common_ancestor(&self, a: Hash, b: Hash) -> DagResult<Hash> {
        if a == b {
            return Ok(a);
        }

        let mut chain_a = self.hash_chain(a);
        let mut chain_b = self.hash_chain(b);
        let mut seen_a = HashSet::new();
        let mut seen_b = HashSet::new();
        let (mut open_a, mut open_b) = (true, true);

        while open_a || open_b {
            if open_a {
                match chain_a.next().transpose()? {
                    Some(hash) if seen_b.contains(&hash) => return Ok(self.found(a, b, hash)),
                    Some(hash) => {
                        seen_a.insert(hash);
                        self.check_limit(&seen_a)?;
                    }
                    None => open_a = false,
                }
            }
            if open_b {
                match chain_b.next().transpose()? {
                    Some(hash) if seen_a.contains(&hash) => return Ok(self.found(a, b, hash)),
                    Some(hash) => {
                        seen_b.insert(hash);
                        self.check_limit(&seen_b)?;
                    }
                    None => open_b = false,
                }
            }
        }

        Err(DagError::NoCommonAncestor { a, b })
    }

    /// Commits strictly after `ancestor` up to and including `tip`, oldest
    /// first. Fails if `ancestor` is not on `tip`'s first-parent chain.
    pub fn commits_between(&self, ancestor: Hash, tip: Hash) -> DagResult<Vec<Commit>> {
        let mut range = Vec::new();
        let mut reached = ancestor.is_no_ancestor();
        for commit in self.commits(tip) {
            let commit = commit?;
            if commit.hash == ancestor {
                reached = true;
                break;
            }
            range.push(commit);
            if range.len() > self.max_walk {
                return Err(DagError::WalkLimitExceeded {
                    limit: self.max_walk,
                });
            }
        }
        if !reached {
            return Err(DagError::NotAncestor {
                ancestor,
                descendant: tip,
            });
        }
        range.reverse();
        Ok(range)
    }

    /// Returns `true` if `ancestor` is `descendant` or one of its first-parent
    /// ancestors.
    pub fn is_ancestor(&self, ancestor: Hash, descendant: Hash) -> DagResult<bool> {
        for (walked, hash) in self.hash_chain(descendant).enumerate() {
            if hash? == ancestor {
                return Ok(true);
            }
            if walked > self.max_walk {
                return Err(DagError::WalkLimitExceeded {
                    limit: self.max_walk,
                });
            }
        }
        Ok(false)
    }

    /// Number of commits on the first-parent chain of `head`, bounded by
    /// the walk limit.
    pub fn count_commits(&self, head: Hash) -> DagResult<usize> {
        let mut count = 0;
        for commit in self.commits(head) {
            commit?;
            count += 1;
            if count > self.max_walk {
                return Err(DagError::WalkLimitExceeded {
                    limit: self.max_walk,
                });
            }
        }
        Ok(count)
    }

    fn check_limit(&self, seen: &HashSet<Hash>) -> DagResult<()> {
        if seen.len() > self.max_walk {
            return Err(DagError::WalkLimitExceeded {
                limit: self.max_walk,
            });
        }
        Ok(())
    }

    fn found(&self, a: Hash, b: Hash, ancestor: Hash) -> Hash {
        debug!(
            a = %a.short_hex(),
            b = %b.short_hex(),
            ancestor = %ancestor.short_hex(),
            "found common ancestor"
        );
        ancestor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cairn_store::{CommitGraph, InMemoryCommitGraph, RepositoryId};
    use cairn_types::{CommitDraft, CommitMeta};

    fn dag(limit: usize) -> CommitDag {
        let graph: Arc<dyn CommitGraph> = Arc::new(InMemoryCommitGraph::new());
        CommitDag::new(ScopedGraph::new(graph, RepositoryId::default()), limit)
    }

    fn commit(dag: &CommitDag, parent: Hash, msg: &str) -> Hash {
        dag.graph()
            .append_commit(CommitDraft::new(parent, CommitMeta::message(msg), vec![]))
            .unwrap()
            .hash
    }

    /// Linear chain of `n` commits on top of `base`, returned oldest first.
    fn chain(dag: &CommitDag, base: Hash, n: usize, prefix: &str) -> Vec<Hash> {
        let mut hashes = Vec::new();
        let mut parent = base;
        for i in 0..n {
            parent = commit(dag, parent, &format!("{prefix}{i}"));
            hashes.push(parent);
        }
        hashes
    }

    #[test]
    fn hash_chain_ends_at_root() {
        let dag = dag(100);
        let c = chain(&dag, Hash::NO_ANCESTOR, 2, "c");
        let hashes: Vec<Hash> = dag.hash_chain(c[1]).map(|h| h.unwrap()).collect();
        assert_eq!(hashes, vec![c[1], c[0], Hash::NO_ANCESTOR]);
    }

    #[test]
    fn common_ancestor_of_fork() {
        let dag = dag(100);
        let trunk = chain(&dag, Hash::NO_ANCESTOR, 3, "t");
        let left = chain(&dag, trunk[2], 4, "l");
        let right = chain(&dag, trunk[2], 1, "r");

        assert_eq!(dag.common_ancestor(left[3], right[0]).unwrap(), trunk[2]);
        assert_eq!(dag.common_ancestor(right[0], left[3]).unwrap(), trunk[2]);
    }

    #[test]
    fn common_ancestor_of_linear_history_is_older_commit() {
        let dag = dag(100);
        let c = chain(&dag, Hash::NO_ANCESTOR, 5, "c");
        assert_eq!(dag.common_ancestor(c[4], c[1]).unwrap(), c[1]);
        assert_eq!(dag.common_ancestor(c[2], c[2]).unwrap(), c[2]);
    }

    #[test]
    fn unrelated_histories_meet_at_root() {
        let dag = dag(100);
        let a = chain(&dag, Hash::NO_ANCESTOR, 2, "a");
        let b = chain(&dag, Hash::NO_ANCESTOR, 3, "b");
        assert_eq!(
            dag.common_ancestor(a[1], b[2]).unwrap(),
            Hash::NO_ANCESTOR
        );
        assert_eq!(
            dag.common_ancestor(Hash::NO_ANCESTOR, b[2]).unwrap(),
            Hash::NO_ANCESTOR
        );
    }

    #[test]
    fn walk_limit_is_enforced() {
        let dag = dag(3);
        let trunk = chain(&dag, Hash::NO_ANCESTOR, 1, "t");
        let long = chain(&dag, trunk[0], 6, "l");
        let short = chain(&dag, trunk[0], 6, "s");
        let err = dag.common_ancestor(long[5], short[5]).unwrap_err();
        assert!(matches!(err, DagError::WalkLimitExceeded { limit: 3 }));
        assert_eq!(err.kind(), cairn_types::ErrorKind::BadRequest);
    }

    #[test]
    fn count_commits_respects_walk_limit() {
        let dag = dag(3);
        let c = chain(&dag, Hash::NO_ANCESTOR, 50, "c");
        let err = dag.count_commits(c[49]).unwrap_err();
        assert!(matches!(err, DagError::WalkLimitExceeded { limit: 3 }));
        assert_eq!(dag.count_commits(c[2]).unwrap(), 3);
    }

    #[test]
    fn commits_between_is_oldest_first_and_exclusive() {
        let dag = dag(100);
        let c = chain(&dag, Hash::NO_ANCESTOR, 4, "c");
        let range: Vec<Hash> = dag
            .commits_between(c[0], c[3])
            .unwrap()
            .into_iter()
            .map(|c| c.hash)
            .collect();
        assert_eq!(range, vec![c[1], c[2], c[3]]);

        let full = dag.commits_between(Hash::NO_ANCESTOR, c[3]).unwrap();
        assert_eq!(full.len(), 4);
        assert!(dag.commits_between(c[3], c[3]).unwrap().is_empty());
    }

    #[test]
    fn commits_between_rejects_non_ancestor() {
        let dag = dag(100);
        let c = chain(&dag, Hash::NO_ANCESTOR, 2, "c");
        let other = chain(&dag, Hash::NO_ANCESTOR, 1, "o");
        let err = dag.commits_between(other[0], c[1]).unwrap_err();
        assert!(matches!(err, DagError::NotAncestor { .. }));
    }

    #[test]
    fn ancestry_checks_and_counts() {
        let dag = dag(100);
        let c = chain(&dag, Hash::NO_ANCESTOR, 3, "c");
        assert!(dag.is_ancestor(c[0], c[2]).unwrap());
        assert!(dag.is_ancestor(Hash::NO_ANCESTOR, c[2]).unwrap());
        assert!(!dag.is_ancestor(c[2], c[0]).unwrap());
        assert_eq!(dag.count_commits(c[2]).unwrap(), 3);
        assert_eq!(dag.count_commits(Hash::NO_ANCESTOR).unwrap(), 0);
    }

    #[test]
    fn missing_start_is_not_found() {
        let dag = dag(100);
        let err = dag
            .common_ancestor(Hash::from_bytes([9; 32]), Hash::NO_ANCESTOR)
            .unwrap_err();
        assert_eq!(err.kind(), cairn_types::ErrorKind::NotFound);
    }
}
