//! Merge and transplant.
//!
//! Both entry points resolve a range of source commits and hand it to a
//! shared replay core:
//!
//! 1. Every key touched by the range gets a behavior (override or default).
//! 2. DROP keys are excluded. Other keys compare the target's current value
//!    with the value at the base; a difference is classified as a conflict.
//! 3. A conflict on a NORMAL key stops the operation before anything is
//!    written. FORCE keys are applied regardless.
//! 4. The surviving operations are written as one squashed commit, or as one
//!    commit per source commit, on top of the target head, and the target is
//!    moved by compare-and-swap.
//!
//! The base is the common ancestor for a merge and the parent of the first
//! transplanted commit for a transplant. Values are compared once per key
//! against that base, not against each replayed commit's own parent.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use tracing::{debug, info, warn};

use cairn_dag::CommitDag;
use cairn_refs::{RefError, ReferenceManager};
use cairn_store::{ScopedGraph, StoreError};
use cairn_types::{
    Commit, CommitDraft, CommitMeta, ConflictType, Content, ContentKey, Hash, MergeBehavior,
    NamedRef, Operation, Reference, MERGE_PARENT_PROPERTY,
};

use crate::error::{MergeError, Result};
use crate::types::{KeyDetails, MergeOptions, MergeResult};

/// Separates source messages in a generated squash message.
const SQUASH_MESSAGE_SEPARATOR: &str = "\n---------------------------------------------\n";

/// A resolved range ready for replay.
struct Replay<'a> {
    target_branch: &'a str,
    expected: Option<Hash>,
    head: Hash,
    base: Hash,
    common_ancestor: Option<Hash>,
    source_tip: Hash,
    commits: Vec<Commit>,
}

/// Net effect of the range on one key.
struct IncomingChange {
    /// `Some` for a put, `None` for a delete.
    content: Option<Content>,
    source_commits: Vec<Hash>,
}

/// Applies commit ranges from one history onto a branch.
#[derive(Clone, Debug)]
pub struct MergeEngine {
    graph: ScopedGraph,
    dag: CommitDag,
    refs: ReferenceManager,
    committer: String,
}

impl MergeEngine {
    pub fn new(
        graph: ScopedGraph,
        refs: ReferenceManager,
        max_walk: usize,
        committer: impl Into<String>,
    ) -> Self {
        Self {
            dag: CommitDag::new(graph.clone(), max_walk),
            graph,
            refs,
            committer: committer.into(),
        }
    }

    /// Merge everything on `from` since its common ancestor with
    /// `target_branch`.
    pub fn merge(
        &self,
        from: &Reference,
        target_branch: &str,
        expected: Option<Hash>,
        options: &MergeOptions,
    ) -> Result<MergeResult> {
        if !self.graph.contains_commit(&from.hash)? {
            return Err(RefError::HashNotFound(from.hash).into());
        }
        let head = self.target_head(target_branch, expected)?;
        let ancestor = self.dag.common_ancestor(from.hash, head)?;
        let commits = self.dag.commits_between(ancestor, from.hash)?;
        debug!(
            from = %from.named_ref,
            branch = target_branch,
            ancestor = %ancestor.short_hex(),
            commits = commits.len(),
            "resolved merge range"
        );

        self.replay(
            Replay {
                target_branch,
                expected,
                head,
                base: ancestor,
                common_ancestor: Some(ancestor),
                source_tip: from.hash,
                commits,
            },
            options,
        )
    }

    /// Replay the given commits, which must form a parent chain in order,
    /// onto `target_branch`.
    pub fn transplant(
        &self,
        target_branch: &str,
        expected: Option<Hash>,
        hashes: &[Hash],
        options: &MergeOptions,
    ) -> Result<MergeResult> {
        let commits = self.load_contiguous(hashes)?;
        let (base, source_tip) = match (commits.first(), commits.last()) {
            (Some(first), Some(last)) => (first.parent, last.hash),
            _ => return Err(MergeError::EmptyTransplant),
        };
        let head = self.target_head(target_branch, expected)?;
        debug!(
            branch = target_branch,
            base = %base.short_hex(),
            commits = commits.len(),
            "resolved transplant range"
        );

        self.replay(
            Replay {
                target_branch,
                expected,
                head,
                base,
                common_ancestor: None,
                source_tip,
                commits,
            },
            options,
        )
    }

    fn load_contiguous(&self, hashes: &[Hash]) -> Result<Vec<Commit>> {
        if hashes.is_empty() {
            return Err(MergeError::EmptyTransplant);
        }
        let mut commits: Vec<Commit> = Vec::with_capacity(hashes.len());
        for hash in hashes {
            let commit = self
                .graph
                .get_commit(hash)?
                .ok_or(MergeError::UnknownCommit(*hash))?;
            if let Some(previous) = commits.last() {
                if commit.parent != previous.hash {
                    return Err(MergeError::NonContiguous {
                        hash: *hash,
                        expected_parent: previous.hash,
                    });
                }
            }
            commits.push(commit);
        }
        Ok(commits)
    }

    fn target_head(&self, target_branch: &str, expected: Option<Hash>) -> Result<Hash> {
        let head = self.refs.get_branch(target_branch)?.hash;
        match expected {
            Some(expected) if expected != head => Err(MergeError::ReferenceConflict {
                branch: target_branch.to_string(),
                expected,
                actual: head,
            }),
            _ => Ok(head),
        }
    }

    fn replay(&self, plan: Replay<'_>, options: &MergeOptions) -> Result<MergeResult> {
        let mut result = MergeResult {
            target_branch: plan.target_branch.to_string(),
            expected_hash: plan.expected,
            effective_target_hash: plan.head,
            resultant_target_hash: plan.head,
            common_ancestor: plan.common_ancestor,
            was_applied: false,
            was_successful: true,
            source_commits: plan.commits.iter().map(|c| c.hash).collect(),
            target_commits: Vec::new(),
            details: Vec::new(),
        };
        if plan.commits.is_empty() {
            debug!(branch = plan.target_branch, "nothing to merge");
            return Ok(result);
        }

        let incoming = collect_changes(&plan.commits);
        let target_side = if options.fetch_additional_info {
            let since = self.dag.common_ancestor(plan.base, plan.head)?;
            self.dag.commits_between(since, plan.head)?
        } else {
            Vec::new()
        };
        result.target_commits = target_side.iter().map(|c| c.hash).collect();

        for (key, change) in &incoming {
            let behavior = options.behavior_for(key);
            let conflict_type = match behavior {
                MergeBehavior::Drop => ConflictType::ExcludedByPolicy,
                MergeBehavior::Normal | MergeBehavior::Force => {
                    let base = self.graph.get_content_at(&plan.base, key)?;
                    let target = self.graph.get_content_at(&plan.head, key)?;
                    classify(change.content.as_ref(), base.as_ref(), target.as_ref())
                }
            };
            debug!(
                key = %key,
                behavior = %behavior,
                conflict = %conflict_type,
                "merge key decision"
            );

            let (source_commits, target_commits) = if options.fetch_additional_info {
                (
                    change.source_commits.clone(),
                    target_side
                        .iter()
                        .filter(|c| c.mutations().any(|op| op.key() == key))
                        .map(|c| c.hash)
                        .collect(),
                )
            } else {
                (Vec::new(), Vec::new())
            };
            result.details.push(KeyDetails {
                key: key.clone(),
                merge_behavior: behavior,
                conflict_type,
                source_commits,
                target_commits,
            });
        }

        let conflicts = result.conflicts().count();
        if conflicts > 0 {
            result.was_successful = false;
            warn!(
                branch = plan.target_branch,
                head = %plan.head.short_hex(),
                conflicts,
                "merge rejected"
            );
            if options.return_conflict_as_result {
                return Ok(result);
            }
            return Err(MergeError::Conflict(Box::new(result)));
        }
        if options.dry_run {
            return Ok(result);
        }

        let dropped: HashSet<ContentKey> = result
            .details
            .iter()
            .filter(|d| d.merge_behavior == MergeBehavior::Drop)
            .map(|d| d.key.clone())
            .collect();
        let new_head = if options.keep_individual_commits {
            self.write_individual(&plan, &dropped)?
        } else {
            self.write_squashed(&plan, &incoming, &dropped, options)?
        };

        let named_ref = NamedRef::branch(plan.target_branch);
        match self.graph.cas_reference(&named_ref, plan.head, new_head) {
            Ok(()) => {}
            Err(StoreError::ReferenceConflict { actual, .. }) => {
                warn!(
                    branch = plan.target_branch,
                    expected = %plan.head.short_hex(),
                    actual = %actual.short_hex(),
                    "lost merge race"
                );
                return Err(MergeError::ReferenceConflict {
                    branch: plan.target_branch.to_string(),
                    expected: plan.head,
                    actual,
                });
            }
            Err(e) => return Err(e.into()),
        }

        result.was_applied = true;
        result.resultant_target_hash = new_head;
        info!(
            branch = plan.target_branch,
            from = %plan.head.short_hex(),
            to = %new_head.short_hex(),
            source = %plan.source_tip.short_hex(),
            commits = plan.commits.len(),
            "applied merge"
        );
        Ok(result)
    }

    fn write_squashed(
        &self,
        plan: &Replay<'_>,
        incoming: &BTreeMap<ContentKey, IncomingChange>,
        dropped: &HashSet<ContentKey>,
        options: &MergeOptions,
    ) -> Result<Hash> {
        let operations: Vec<Operation> = incoming
            .iter()
            .filter(|(key, _)| !dropped.contains(*key))
            .map(|(key, change)| match &change.content {
                Some(content) => Operation::put(key.clone(), content.clone()),
                None => Operation::delete(key.clone()),
            })
            .collect();

        let message = options.message.clone().unwrap_or_else(|| {
            plan.commits
                .iter()
                .map(|c| c.meta.message.as_str())
                .collect::<Vec<_>>()
                .join(SQUASH_MESSAGE_SEPARATOR)
        });
        let meta = CommitMeta::message(message)
            .with_property(MERGE_PARENT_PROPERTY, plan.source_tip.to_hex())
            .stamped(&self.committer, Utc::now());

        let draft = CommitDraft::new(plan.head, meta, operations)
            .with_additional_parent(plan.source_tip);
        Ok(self.graph.append_commit(draft)?.hash)
    }

    fn write_individual(&self, plan: &Replay<'_>, dropped: &HashSet<ContentKey>) -> Result<Hash> {
        let now = Utc::now();
        let mut parent = plan.head;
        for commit in &plan.commits {
            debug!(commit = %commit.summary(), branch = plan.target_branch, "replaying commit");
            let operations: Vec<Operation> = commit
                .mutations()
                .filter(|op| !dropped.contains(op.key()))
                .map(|op| match op {
                    Operation::Put { key, content, .. } => {
                        Operation::put(key.clone(), content.clone())
                    }
                    other => other.clone(),
                })
                .collect();
            let meta = commit.meta.clone().stamped(&self.committer, now);
            parent = self
                .graph
                .append_commit(CommitDraft::new(parent, meta, operations))?
                .hash;
        }
        Ok(parent)
    }
}

/// Net effect of `commits` per key, in key order. Unchanged operations do
/// not touch a key.
fn collect_changes(commits: &[Commit]) -> BTreeMap<ContentKey, IncomingChange> {
    let mut changes: BTreeMap<ContentKey, IncomingChange> = BTreeMap::new();
    for commit in commits {
        for op in commit.mutations() {
            let Some(effect) = op.effect() else {
                continue;
            };
            let change = changes
                .entry(op.key().clone())
                .or_insert_with(|| IncomingChange {
                    content: None,
                    source_commits: Vec::new(),
                });
            change.content = effect.cloned();
            if change.source_commits.last() != Some(&commit.hash) {
                change.source_commits.push(commit.hash);
            }
        }
    }
    changes
}

/// Classify how the target diverged from the base for one key.
///
/// `incoming` is `Some` for a put and `None` for a delete.
pub fn classify(
    incoming: Option<&Content>,
    base: Option<&Content>,
    target: Option<&Content>,
) -> ConflictType {
    if target == base {
        return ConflictType::None;
    }
    match (incoming, base, target) {
        (Some(_), None, Some(_)) => ConflictType::KeyExists,
        (_, Some(_), None) => ConflictType::KeyDoesNotExist,
        (Some(_), Some(_), Some(_)) => ConflictType::ValueDiffers,
        (None, _, Some(_)) => ConflictType::UnresolvableDelete,
        (_, None, None) => ConflictType::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cairn_refs::RefSpec;
    use cairn_store::{CommitGraph, InMemoryCommitGraph, RepositoryId};
    use cairn_types::{ContentType, ErrorKind, RefType};
    use serde_json::json;

    struct Fixture {
        backend: Arc<InMemoryCommitGraph>,
        graph: ScopedGraph,
        refs: ReferenceManager,
        engine: MergeEngine,
    }

    fn fixture() -> Fixture {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let backend = Arc::new(InMemoryCommitGraph::new());
        let dyn_backend: Arc<dyn CommitGraph> = backend.clone();
        let graph = ScopedGraph::new(dyn_backend, RepositoryId::default());
        let refs = ReferenceManager::new(graph.clone(), "main", 1000);
        refs.create("main", RefType::Branch, None).unwrap();
        let engine = MergeEngine::new(graph.clone(), refs.clone(), 1000, "cairn");
        Fixture {
            backend,
            graph,
            refs,
            engine,
        }
    }

    impl Fixture {
        fn commit(&self, branch: &str, ops: Vec<Operation>, msg: &str) -> Hash {
            let head = self.refs.get(branch).unwrap().hash;
            let hash = self
                .graph
                .append_commit(CommitDraft::new(head, CommitMeta::message(msg), ops))
                .unwrap()
                .hash;
            self.graph
                .cas_reference(&NamedRef::branch(branch), head, hash)
                .unwrap();
            hash
        }

        fn branch_from(&self, name: &str, source: &str) {
            self.refs
                .create(name, RefType::Branch, Some(&RefSpec::named(source)))
                .unwrap();
        }

        fn head(&self, branch: &str) -> Hash {
            self.refs.get(branch).unwrap().hash
        }

        fn value(&self, branch: &str, key: &ContentKey) -> Option<Content> {
            self.graph.get_content_at(&self.head(branch), key).unwrap()
        }

        fn commit_count(&self) -> usize {
            self.backend.commit_count(&RepositoryId::default()).unwrap()
        }
    }

    fn key(name: &str) -> ContentKey {
        ContentKey::of(&["ns", name])
    }

    fn table(v: i64) -> Content {
        Content::new(ContentType::IcebergTable, json!({ "snapshot": v }))
    }

    /// `main` holds `k = base`; `dev` forks, then `main` sets `k = target`
    /// and `dev` sets `k = source`.
    fn diverged(fx: &Fixture) -> (Content, Content, Content) {
        let base = table(1);
        fx.commit("main", vec![Operation::put(key("k"), base.clone())], "base");
        fx.branch_from("dev", "main");
        let target = base.updated(json!({ "snapshot": 2 }));
        let source = base.updated(json!({ "snapshot": 3 }));
        fx.commit("main", vec![Operation::put(key("k"), target.clone())], "on main");
        fx.commit("dev", vec![Operation::put(key("k"), source.clone())], "on dev");
        (base, target, source)
    }

    // ---- Test 1: Fast-moving source merges cleanly ----
    #[test]
    fn merge_applies_both_source_commits() {
        let fx = fixture();
        fx.commit("main", vec![Operation::put(key("k1"), table(1))], "c1");
        fx.branch_from("a", "main");
        let v2 = table(2);
        let v3 = v2.updated(json!({ "snapshot": 3 }));
        fx.commit("main", vec![Operation::put(key("k2"), v2)], "c2");
        let h3 = fx.commit("main", vec![Operation::put(key("k2"), v3.clone())], "c3");

        let from = fx.refs.get("main").unwrap();
        let result = fx
            .engine
            .merge(&from, "a", None, &MergeOptions::default())
            .unwrap();

        assert!(result.was_successful);
        assert!(result.was_applied);
        assert_eq!(result.source_commits.len(), 2);
        assert_eq!(fx.head("a"), result.resultant_target_hash);
        assert_eq!(fx.value("a", &key("k2")), Some(v3));

        let merge_commit = fx
            .graph
            .get_commit(&result.resultant_target_hash)
            .unwrap()
            .unwrap();
        assert_eq!(merge_commit.additional_parents, vec![h3]);
        assert_eq!(
            merge_commit.meta.properties.get(MERGE_PARENT_PROPERTY),
            Some(&h3.to_hex())
        );
        assert!(merge_commit.meta.message.contains("c2"));
        assert!(merge_commit.meta.message.contains("c3"));
    }

    // ---- Test 2: NORMAL divergence fails with the populated result ----
    #[test]
    fn normal_divergence_is_a_conflict() {
        let fx = fixture();
        let (_, target, _) = diverged(&fx);
        let head = fx.head("main");
        let from = fx.refs.get("dev").unwrap();

        let err = fx
            .engine
            .merge(&from, "main", Some(head), &MergeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MergeConflict);
        let result = err.merge_result().unwrap();
        assert!(!result.was_successful);
        assert_eq!(
            result.details_for(&key("k")).unwrap().conflict_type,
            ConflictType::ValueDiffers
        );
        assert_eq!(fx.head("main"), head);
        assert_eq!(fx.value("main", &key("k")), Some(target));
    }

    // ---- Test 3: Conflicts as a result leave the target untouched ----
    #[test]
    fn conflict_as_result() {
        let fx = fixture();
        diverged(&fx);
        let head = fx.head("main");
        let from = fx.refs.get("dev").unwrap();
        let before = fx.commit_count();

        let result = fx
            .engine
            .merge(
                &from,
                "main",
                None,
                &MergeOptions::new().return_conflict_as_result(true),
            )
            .unwrap();
        assert!(!result.was_successful);
        assert!(!result.was_applied);
        assert_eq!(result.resultant_target_hash, head);
        assert_eq!(result.conflicts().count(), 1);
        assert_eq!(fx.head("main"), head);
        assert_eq!(fx.commit_count(), before);
    }

    // ---- Test 4: FORCE overwrites and still reports divergence ----
    #[test]
    fn force_overrides_divergence() {
        let fx = fixture();
        let (_, _, source) = diverged(&fx);
        let from = fx.refs.get("dev").unwrap();

        let result = fx
            .engine
            .merge(
                &from,
                "main",
                None,
                &MergeOptions::new().key_behavior(key("k"), MergeBehavior::Force),
            )
            .unwrap();
        assert!(result.was_successful);
        assert!(result.was_applied);
        let detail = result.details_for(&key("k")).unwrap();
        assert_eq!(detail.merge_behavior, MergeBehavior::Force);
        assert_eq!(detail.conflict_type, ConflictType::ValueDiffers);
        assert_eq!(fx.value("main", &key("k")), Some(source));
    }

    // ---- Test 5: DROP leaves content alone but advances the branch ----
    #[test]
    fn drop_everything_keeps_content() {
        let fx = fixture();
        let (_, target, _) = diverged(&fx);
        fx.commit("dev", vec![Operation::put(key("other"), table(9))], "more");
        let head = fx.head("main");
        let before = fx.graph.entries_at(&head).unwrap();
        let from = fx.refs.get("dev").unwrap();

        let result = fx
            .engine
            .merge(
                &from,
                "main",
                None,
                &MergeOptions::new().default_behavior(MergeBehavior::Drop),
            )
            .unwrap();
        assert!(result.was_applied);
        assert!(result
            .details
            .iter()
            .all(|d| d.conflict_type == ConflictType::ExcludedByPolicy));
        assert_ne!(fx.head("main"), head);
        assert_eq!(fx.graph.entries_at(&fx.head("main")).unwrap(), before);
        assert_eq!(fx.value("main", &key("k")), Some(target));
    }

    // ---- Test 6: Dry run writes nothing ----
    #[test]
    fn dry_run_reports_without_writing() {
        let fx = fixture();
        fx.branch_from("dev", "main");
        fx.commit("dev", vec![Operation::put(key("t"), table(1))], "t");
        let before = fx.commit_count();
        let from = fx.refs.get("dev").unwrap();

        let result = fx
            .engine
            .merge(&from, "main", None, &MergeOptions::new().dry_run(true))
            .unwrap();
        assert!(result.was_successful);
        assert!(!result.was_applied);
        assert_eq!(result.details.len(), 1);
        assert!(fx.head("main").is_no_ancestor());
        assert_eq!(fx.commit_count(), before);
    }

    // ---- Test 7: Unchanged target never conflicts ----
    #[test]
    fn untouched_target_key_merges() {
        let fx = fixture();
        fx.commit("main", vec![Operation::put(key("k"), table(1))], "base");
        fx.branch_from("dev", "main");
        fx.commit("main", vec![Operation::put(key("unrelated"), table(5))], "other");
        let incoming = table(7);
        fx.commit("dev", vec![Operation::put(key("k"), incoming.clone())], "update");
        let from = fx.refs.get("dev").unwrap();

        let result = fx
            .engine
            .merge(&from, "main", None, &MergeOptions::default())
            .unwrap();
        assert_eq!(
            result.details_for(&key("k")).unwrap().conflict_type,
            ConflictType::None
        );
        assert_eq!(fx.value("main", &key("k")), Some(incoming));
        assert!(fx.value("main", &key("unrelated")).is_some());
    }

    // ---- Test 8: Conflict classification per case ----
    #[test]
    fn conflict_types_by_case() {
        let fx = fixture();
        fx.commit(
            "main",
            vec![
                Operation::put(key("modified"), table(1)),
                Operation::put(key("deleted"), table(1)),
            ],
            "base",
        );
        fx.branch_from("dev", "main");
        fx.commit(
            "main",
            vec![
                Operation::put(key("created"), table(2)),
                Operation::put(key("modified"), table(2)),
                Operation::delete(key("deleted")),
            ],
            "target side",
        );
        fx.commit(
            "dev",
            vec![
                Operation::put(key("created"), table(3)),
                Operation::delete(key("modified")),
                Operation::put(key("deleted"), table(3)),
            ],
            "source side",
        );
        let from = fx.refs.get("dev").unwrap();
        let result = fx
            .engine
            .merge(
                &from,
                "main",
                None,
                &MergeOptions::new().return_conflict_as_result(true),
            )
            .unwrap();

        let kind = |name: &str| result.details_for(&key(name)).unwrap().conflict_type;
        assert_eq!(kind("created"), ConflictType::KeyExists);
        assert_eq!(kind("modified"), ConflictType::UnresolvableDelete);
        assert_eq!(kind("deleted"), ConflictType::KeyDoesNotExist);
    }

    #[test]
    fn classify_matrix() {
        let a = table(1);
        let b = table(2);
        let c = table(3);
        assert_eq!(classify(Some(&c), Some(&a), Some(&a)), ConflictType::None);
        assert_eq!(classify(None, None, None), ConflictType::None);
        assert_eq!(classify(Some(&c), None, Some(&b)), ConflictType::KeyExists);
        assert_eq!(classify(Some(&c), Some(&a), None), ConflictType::KeyDoesNotExist);
        assert_eq!(classify(None, Some(&a), None), ConflictType::KeyDoesNotExist);
        assert_eq!(classify(Some(&c), Some(&a), Some(&b)), ConflictType::ValueDiffers);
        assert_eq!(classify(None, Some(&a), Some(&b)), ConflictType::UnresolvableDelete);
        assert_eq!(classify(None, None, Some(&b)), ConflictType::UnresolvableDelete);
    }

    // ---- Test 9: Stale expected hash ----
    #[test]
    fn stale_expected_hash_is_rejected() {
        let fx = fixture();
        fx.branch_from("dev", "main");
        fx.commit("dev", vec![Operation::put(key("t"), table(1))], "t");
        fx.commit("main", vec![Operation::put(key("u"), table(1))], "u");
        let from = fx.refs.get("dev").unwrap();

        let err = fx
            .engine
            .merge(&from, "main", Some(Hash::NO_ANCESTOR), &MergeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    // ---- Test 10: Nothing new on the source ----
    #[test]
    fn empty_range_is_a_successful_noop() {
        let fx = fixture();
        fx.commit("main", vec![Operation::put(key("t"), table(1))], "t");
        fx.branch_from("dev", "main");
        let head = fx.head("main");
        let from = fx.refs.get("dev").unwrap();

        let result = fx
            .engine
            .merge(&from, "main", None, &MergeOptions::default())
            .unwrap();
        assert!(result.was_successful);
        assert!(!result.was_applied);
        assert_eq!(result.common_ancestor, Some(head));
        assert_eq!(fx.head("main"), head);
    }

    // ---- Test 11: Transplant keeps individual commits ----
    #[test]
    fn transplant_individual_commits() {
        let fx = fixture();
        fx.branch_from("dev", "main");
        let d1 = fx.commit("dev", vec![Operation::put(key("a"), table(1))], "first");
        let d2 = fx.commit("dev", vec![Operation::put(key("b"), table(2))], "second");
        fx.commit("main", vec![Operation::put(key("c"), table(3))], "main work");

        let result = fx
            .engine
            .transplant(
                "main",
                None,
                &[d1, d2],
                &MergeOptions::new().keep_individual_commits(true),
            )
            .unwrap();
        assert!(result.was_applied);
        assert!(result.common_ancestor.is_none());

        let messages: Vec<String> = fx
            .graph
            .walk_ancestry(fx.head("main"))
            .map(|c| c.unwrap().meta.message)
            .collect();
        assert_eq!(messages, vec!["second", "first", "main work"]);
        assert!(fx.value("main", &key("a")).is_some());
        assert!(fx.value("main", &key("c")).is_some());
    }

    // ---- Test 12: Transplant validates its input ----
    #[test]
    fn transplant_rejects_bad_ranges() {
        let fx = fixture();
        fx.branch_from("dev", "main");
        let d1 = fx.commit("dev", vec![Operation::put(key("a"), table(1))], "first");
        let _d2 = fx.commit("dev", vec![Operation::put(key("b"), table(2))], "second");
        let d3 = fx.commit("dev", vec![Operation::put(key("c"), table(3))], "third");
        let before = fx.commit_count();
        let options = MergeOptions::default();

        let gap = fx.engine.transplant("main", None, &[d1, d3], &options).unwrap_err();
        assert!(matches!(gap, MergeError::NonContiguous { .. }));
        assert_eq!(gap.kind(), ErrorKind::BadRequest);

        let reversed = fx.engine.transplant("main", None, &[d3, d1], &options).unwrap_err();
        assert_eq!(reversed.kind(), ErrorKind::BadRequest);

        let empty = fx.engine.transplant("main", None, &[], &options).unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::BadRequest);

        let unknown = fx
            .engine
            .transplant("main", None, &[Hash::from_bytes([8; 32])], &options)
            .unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::BadRequest);

        assert_eq!(fx.commit_count(), before);
        assert!(fx.head("main").is_no_ancestor());
    }

    // ---- Test 13: Transplant compares against the parent of the first commit ----
    #[test]
    fn transplant_detects_divergence_from_its_base() {
        let fx = fixture();
        let (_, _, _) = diverged(&fx);
        let dev_head = fx.head("dev");

        let err = fx
            .engine
            .transplant("main", None, &[dev_head], &MergeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MergeConflict);
    }

    // ---- Test 14: Additional info lists the commits per key ----
    #[test]
    fn additional_info_lists_commits() {
        let fx = fixture();
        fx.commit("main", vec![Operation::put(key("k"), table(1))], "base");
        fx.branch_from("dev", "main");
        let m1 = fx.commit("main", vec![Operation::put(key("k"), table(2))], "m1");
        let d1 = fx.commit("dev", vec![Operation::put(key("k"), table(3))], "d1");
        let d2 = fx.commit("dev", vec![Operation::put(key("x"), table(4))], "d2");
        let from = fx.refs.get("dev").unwrap();

        let result = fx
            .engine
            .merge(
                &from,
                "main",
                None,
                &MergeOptions::new()
                    .fetch_additional_info(true)
                    .default_behavior(MergeBehavior::Force),
            )
            .unwrap();
        assert_eq!(result.source_commits, vec![d1, d2]);
        assert_eq!(result.target_commits, vec![m1]);
        let k = result.details_for(&key("k")).unwrap();
        assert_eq!(k.source_commits, vec![d1]);
        assert_eq!(k.target_commits, vec![m1]);
        let x = result.details_for(&key("x")).unwrap();
        assert_eq!(x.source_commits, vec![d2]);
        assert!(x.target_commits.is_empty());
    }
}
