use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use cairn_commit::CommitEngine;
use cairn_dag::{CommitDag, IntegrityReport};
use cairn_diff::{DiffEngine, DiffEntry, KeyEntry};
use cairn_log::{HistoryWalker, LogEntry, LogPage, LogRequest};
use cairn_merge::{MergeEngine, MergeOptions, MergeResult};
use cairn_refs::{RefError, RefSpec, ReferenceInfo, ReferenceManager, ReferenceMetadata};
use cairn_store::{CommitGraph, InMemoryCommitGraph, RepositoryId, ScopedGraph};
use cairn_types::{
    Commit, CommitMeta, Content, ContentKey, Hash, Operation, Predicate, RefType, Reference,
};

use crate::config::VersionStoreConfig;
use crate::error::VersionStoreResult;

/// High-level API over one repository of a commit graph.
///
/// Reference specs (`name`, `name@hash`, `@hash`) are resolved through the
/// reference manager before any read, so every read operation accepts a
/// branch, a tag or a bare commit.
#[derive(Clone, Debug)]
pub struct VersionStore {
    config: VersionStoreConfig,
    graph: ScopedGraph,
    refs: ReferenceManager,
    commits: CommitEngine,
    history: HistoryWalker,
    merges: MergeEngine,
    diffs: DiffEngine,
    dag: CommitDag,
}

impl VersionStore {
    /// Bind to `repository` inside `backend`. Nothing is written; call
    /// [`init`](Self::init) to create the default branch.
    pub fn new(
        backend: Arc<dyn CommitGraph>,
        repository: RepositoryId,
        config: VersionStoreConfig,
    ) -> VersionStoreResult<Self> {
        config.validate()?;
        let graph = ScopedGraph::new(backend, repository);
        let refs = ReferenceManager::new(
            graph.clone(),
            config.default_branch.clone(),
            config.max_ancestor_walk,
        );
        Ok(Self {
            commits: CommitEngine::new(graph.clone(), refs.clone(), config.committer.clone()),
            history: HistoryWalker::new(graph.clone(), config.max_log_entries),
            merges: MergeEngine::new(
                graph.clone(),
                refs.clone(),
                config.max_ancestor_walk,
                config.committer.clone(),
            ),
            diffs: DiffEngine::new(graph.clone()),
            dag: CommitDag::new(graph.clone(), config.max_ancestor_walk),
            graph,
            refs,
            config,
        })
    }

    /// A store over a fresh in-memory backend, already initialized.
    pub fn in_memory(config: VersionStoreConfig) -> VersionStoreResult<Self> {
        let store = Self::new(
            Arc::new(InMemoryCommitGraph::new()),
            RepositoryId::default(),
            config,
        )?;
        store.init()?;
        Ok(store)
    }

    /// Create the default branch at the root if it does not exist yet.
    pub fn init(&self) -> VersionStoreResult<Reference> {
        match self.refs.default_branch() {
            Ok(branch) => Ok(branch),
            Err(RefError::NotFound { .. }) => {
                let branch =
                    self.refs
                        .create(&self.config.default_branch, RefType::Branch, None)?;
                info!(
                    repo = %self.graph.repository(),
                    branch = branch.name(),
                    "initialized repository"
                );
                Ok(branch)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn config(&self) -> &VersionStoreConfig {
        &self.config
    }

    pub fn repository(&self) -> &RepositoryId {
        self.graph.repository()
    }

    // ---- References ----

    pub fn default_branch(&self) -> VersionStoreResult<Reference> {
        Ok(self.refs.default_branch()?)
    }

    pub fn get_reference(&self, name: &str) -> VersionStoreResult<Reference> {
        Ok(self.refs.get(name)?)
    }

    pub fn resolve(&self, spec: &RefSpec) -> VersionStoreResult<Reference> {
        Ok(self.refs.resolve(spec)?)
    }

    /// Parse and resolve a textual reference spec.
    pub fn resolve_str(&self, spec: &str) -> VersionStoreResult<Reference> {
        Ok(self.refs.resolve_str(spec)?)
    }

    pub fn create_reference(
        &self,
        name: &str,
        ref_type: RefType,
        source: Option<&RefSpec>,
    ) -> VersionStoreResult<Reference> {
        Ok(self.refs.create(name, ref_type, source)?)
    }

    pub fn assign_reference(
        &self,
        name: &str,
        ref_type: RefType,
        expected: Hash,
        target: &RefSpec,
    ) -> VersionStoreResult<Reference> {
        Ok(self.refs.assign(name, ref_type, expected, target)?)
    }

    pub fn delete_reference(
        &self,
        name: &str,
        ref_type: RefType,
        expected: Hash,
    ) -> VersionStoreResult<()> {
        Ok(self.refs.delete(name, ref_type, expected)?)
    }

    pub fn list_references(
        &self,
        filter: Option<&dyn Predicate<Reference>>,
    ) -> VersionStoreResult<Vec<Reference>> {
        Ok(self.refs.list(filter)?)
    }

    pub fn list_references_with_metadata(
        &self,
        filter: Option<&dyn Predicate<Reference>>,
    ) -> VersionStoreResult<Vec<ReferenceInfo>> {
        Ok(self.refs.list_with_metadata(filter)?)
    }

    /// How `spec` relates to the default branch.
    pub fn reference_metadata(&self, spec: &RefSpec) -> VersionStoreResult<ReferenceMetadata> {
        let reference = self.refs.resolve(spec)?;
        Ok(self.refs.metadata(&reference)?)
    }

    // ---- Commits and history ----

    /// Commit `operations` on `branch`; returns the branch at its new head.
    pub fn commit(
        &self,
        branch: &str,
        expected: Option<Hash>,
        operations: Vec<Operation>,
        meta: CommitMeta,
    ) -> VersionStoreResult<Reference> {
        Ok(self.commits.commit(branch, expected, operations, meta)?)
    }

    pub fn get_commit(&self, hash: &Hash) -> VersionStoreResult<Option<Commit>> {
        Ok(self.graph.get_commit(hash)?)
    }

    pub fn log(
        &self,
        request: &LogRequest,
        filter: Option<&dyn Predicate<LogEntry>>,
    ) -> VersionStoreResult<LogPage> {
        Ok(self.history.log(request, filter)?)
    }

    /// First log page starting at whatever `spec` resolves to.
    pub fn log_from(
        &self,
        spec: &RefSpec,
        max_records: Option<usize>,
        filter: Option<&dyn Predicate<LogEntry>>,
    ) -> VersionStoreResult<LogPage> {
        let start = self.refs.resolve(spec)?.hash;
        let mut request = LogRequest::new(start);
        request.max_records = max_records;
        self.log(&request, filter)
    }

    /// Verify the hashes and parent links of `spec`'s history.
    pub fn verify_history(&self, spec: &RefSpec) -> VersionStoreResult<IntegrityReport> {
        let head = self.refs.resolve(spec)?.hash;
        Ok(self.dag.verify_chain(head)?)
    }

    // ---- Merge and transplant ----

    /// Merge options starting from the configured default behavior.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions::new().default_behavior(self.config.default_merge_behavior)
    }

    /// Merge `from` into `target_branch`.
    pub fn merge(
        &self,
        from: &RefSpec,
        target_branch: &str,
        expected: Option<Hash>,
        options: &MergeOptions,
    ) -> VersionStoreResult<MergeResult> {
        let from = self.refs.resolve(from)?;
        Ok(self.merges.merge(&from, target_branch, expected, options)?)
    }

    /// Replay `hashes`, a contiguous parent chain, onto `target_branch`.
    pub fn transplant(
        &self,
        target_branch: &str,
        expected: Option<Hash>,
        hashes: &[Hash],
        options: &MergeOptions,
    ) -> VersionStoreResult<MergeResult> {
        Ok(self
            .merges
            .transplant(target_branch, expected, hashes, options)?)
    }

    // ---- Content ----

    pub fn get_content(
        &self,
        spec: &RefSpec,
        key: &ContentKey,
    ) -> VersionStoreResult<Option<Content>> {
        let at = self.refs.resolve(spec)?.hash;
        Ok(self.graph.get_content_at(&at, key)?)
    }

    pub fn contents(
        &self,
        spec: &RefSpec,
        keys: &[ContentKey],
    ) -> VersionStoreResult<BTreeMap<ContentKey, Content>> {
        let at = self.refs.resolve(spec)?.hash;
        Ok(self.diffs.contents(&at, keys)?)
    }

    pub fn entries(
        &self,
        spec: &RefSpec,
        filter: Option<&dyn Predicate<KeyEntry>>,
        namespace_depth: Option<usize>,
    ) -> VersionStoreResult<Vec<KeyEntry>> {
        let at = self.refs.resolve(spec)?.hash;
        Ok(self.diffs.entries(&at, filter, namespace_depth)?)
    }

    /// Keys whose content differs between `from` and `to`.
    pub fn diff(&self, from: &RefSpec, to: &RefSpec) -> VersionStoreResult<Vec<DiffEntry>> {
        let from = self.refs.resolve(from)?.hash;
        let to = self.refs.resolve(to)?.hash;
        Ok(self.diffs.diff(&from, &to)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    use cairn_log::{collect_all_pages, FetchOption};
    use cairn_types::{ConflictType, ContentType, ErrorKind, MergeBehavior, PredicateError};
    use serde_json::json;

    fn store() -> VersionStore {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        VersionStore::in_memory(VersionStoreConfig::default()).unwrap()
    }

    fn key(name: &str) -> ContentKey {
        ContentKey::of(&["warehouse", name])
    }

    fn table(snapshot: i64) -> Content {
        Content::new(ContentType::IcebergTable, json!({ "snapshot": snapshot }))
    }

    fn main_branch() -> RefSpec {
        RefSpec::named("main")
    }

    // ---- Test 1: Init is idempotent ----
    #[test]
    fn init_creates_default_branch_once() {
        let store = store();
        let again = store.init().unwrap();
        assert!(again.hash.is_no_ancestor());
        assert_eq!(store.list_references(None).unwrap().len(), 1);
    }

    // ---- Test 2: Optimistic commits on one branch ----
    #[test]
    fn stale_commit_conflicts_then_retry_succeeds() {
        let store = store();
        let h0 = store.default_branch().unwrap().hash;
        let v1 = table(1);
        let v2 = v1.updated(json!({ "snapshot": 2 }));

        let h1 = store
            .commit(
                "main",
                Some(h0),
                vec![Operation::put(key("k1"), v1)],
                CommitMeta::message("c1"),
            )
            .unwrap()
            .hash;

        let err = store
            .commit(
                "main",
                Some(h0),
                vec![Operation::put(key("k1"), v2.clone())],
                CommitMeta::message("c2"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let h2 = store
            .commit(
                "main",
                Some(h1),
                vec![Operation::put(key("k1"), v2.clone())],
                CommitMeta::message("c2"),
            )
            .unwrap()
            .hash;
        assert_eq!(store.default_branch().unwrap().hash, h2);
        assert_eq!(store.get_content(&main_branch(), &key("k1")).unwrap(), Some(v2));
    }

    // ---- Test 3: Exactly one of many racing writers wins ----
    #[test]
    fn concurrent_commits_have_one_winner() {
        let store = store();
        let h0 = store.default_branch().unwrap().hash;
        let writers = 8;
        let barrier = Arc::new(Barrier::new(writers));

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let store = store.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.commit(
                        "main",
                        Some(h0),
                        vec![Operation::put(key("k"), table(i as i64))],
                        CommitMeta::message(format!("writer {i}")),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<&Reference> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        for result in &results {
            if let Err(e) = result {
                assert_eq!(e.kind(), ErrorKind::Conflict);
            }
        }
        assert_eq!(store.default_branch().unwrap().hash, winners[0].hash);
    }

    // ---- Test 4: Merging a fast-moving main into a feature branch ----
    #[test]
    fn merge_main_into_feature_branch() {
        let store = store();
        store
            .commit(
                "main",
                None,
                vec![Operation::put(key("k1"), table(1))],
                CommitMeta::message("c1"),
            )
            .unwrap();
        store
            .create_reference("a", RefType::Branch, Some(&main_branch()))
            .unwrap();

        let v2 = table(2);
        let v3 = v2.updated(json!({ "snapshot": 3 }));
        store
            .commit("main", None, vec![Operation::put(key("k2"), v2)], CommitMeta::message("c2"))
            .unwrap();
        store
            .commit(
                "main",
                None,
                vec![Operation::put(key("k2"), v3.clone())],
                CommitMeta::message("c3"),
            )
            .unwrap();

        let result = store
            .merge(&main_branch(), "a", None, &store.merge_options())
            .unwrap();
        assert!(result.was_successful);
        assert_eq!(
            store.get_content(&RefSpec::named("a"), &key("k2")).unwrap(),
            Some(v3)
        );
        assert!(store
            .diff(&main_branch(), &RefSpec::named("a"))
            .unwrap()
            .is_empty());

        let meta = store.reference_metadata(&RefSpec::named("a")).unwrap();
        assert_eq!(meta.ahead, 1);
        assert_eq!(meta.behind, 2);
    }

    // ---- Test 5: Configured default behavior feeds merge options ----
    #[test]
    fn configured_merge_behavior() {
        let config = VersionStoreConfig {
            default_merge_behavior: MergeBehavior::Drop,
            ..VersionStoreConfig::default()
        };
        let store = VersionStore::in_memory(config).unwrap();
        store
            .create_reference("dev", RefType::Branch, Some(&main_branch()))
            .unwrap();
        store
            .commit("dev", None, vec![Operation::put(key("t"), table(1))], CommitMeta::message("t"))
            .unwrap();

        let before = store.default_branch().unwrap().hash;
        let result = store
            .merge(&RefSpec::named("dev"), "main", Some(before), &store.merge_options())
            .unwrap();
        assert_eq!(result.details[0].conflict_type, ConflictType::ExcludedByPolicy);
        assert_ne!(store.default_branch().unwrap().hash, before);
        assert!(store.entries(&main_branch(), None, None).unwrap().is_empty());
    }

    // ---- Test 6: Conflicts surface through the facade ----
    #[test]
    fn merge_conflict_error_carries_result() {
        let store = store();
        let base = table(1);
        store
            .commit(
                "main",
                None,
                vec![Operation::put(key("k"), base.clone())],
                CommitMeta::message("base"),
            )
            .unwrap();
        store
            .create_reference("dev", RefType::Branch, Some(&main_branch()))
            .unwrap();
        store
            .commit(
                "main",
                None,
                vec![Operation::put(key("k"), base.updated(json!({ "snapshot": 2 })))],
                CommitMeta::message("main"),
            )
            .unwrap();
        store
            .commit(
                "dev",
                None,
                vec![Operation::put(key("k"), base.updated(json!({ "snapshot": 3 })))],
                CommitMeta::message("dev"),
            )
            .unwrap();

        let err = store
            .merge(&RefSpec::named("dev"), "main", None, &store.merge_options())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MergeConflict);
        let result = err.merge_result().unwrap();
        assert!(!result.was_successful);
        assert_eq!(result.conflicts().count(), 1);
    }

    // ---- Test 7: Paged log over a detached spec ----
    #[test]
    fn log_pages_cover_history() {
        let store = store();
        for i in 0..7 {
            store
                .commit(
                    "main",
                    None,
                    vec![Operation::put(key("k"), table(i))],
                    CommitMeta::message(format!("c{i}")),
                )
                .unwrap();
        }
        let head = store.default_branch().unwrap().hash;

        let page = store.log_from(&RefSpec::detached(head), Some(3), None).unwrap();
        assert_eq!(page.entries.len(), 3);
        assert!(page.has_more);
        assert_eq!(page.entries[0].meta.message, "c6");

        let request = LogRequest::new(head)
            .with_max_records(2)
            .with_fetch(FetchOption::All);
        let walker = HistoryWalker::new(store.graph.clone(), store.config().max_log_entries);
        let all = collect_all_pages(&walker, &request, None).unwrap();
        assert_eq!(all.len(), 7);
        assert!(all.iter().all(|e| e.operations.as_ref().map(Vec::len) == Some(1)));

        let failing = |_: &LogEntry| -> Result<bool, PredicateError> {
            Err(PredicateError::new("unparseable"))
        };
        let err = store.log_from(&main_branch(), None, Some(&failing)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    // ---- Test 8: Transplant through the facade ----
    #[test]
    fn transplant_rejects_gaps_without_writing() {
        let store = store();
        store
            .create_reference("dev", RefType::Branch, Some(&main_branch()))
            .unwrap();
        let mut picked = Vec::new();
        for i in 0..3 {
            picked.push(
                store
                    .commit(
                        "dev",
                        None,
                        vec![Operation::put(key(&format!("t{i}")), table(i))],
                        CommitMeta::message(format!("t{i}")),
                    )
                    .unwrap()
                    .hash,
            );
        }

        let options = store.merge_options();
        let err = store
            .transplant("main", None, &[picked[0], picked[2]], &options)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(store.default_branch().unwrap().hash.is_no_ancestor());

        let result = store.transplant("main", None, &picked[1..], &options).unwrap();
        assert!(result.was_applied);
        let keys: Vec<ContentKey> = store
            .entries(&main_branch(), None, None)
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec![key("t1"), key("t2")]);
    }

    // ---- Test 9: References and history integrity ----
    #[test]
    fn tags_and_integrity() {
        let store = store();
        let h1 = store
            .commit(
                "main",
                None,
                vec![Operation::put(key("a"), table(1))],
                CommitMeta::message("a"),
            )
            .unwrap()
            .hash;
        store
            .create_reference("v1", RefType::Tag, Some(&main_branch()))
            .unwrap();
        store
            .commit("main", None, vec![Operation::delete(key("a"))], CommitMeta::message("rm"))
            .unwrap();

        assert_eq!(store.resolve_str("v1").unwrap().hash, h1);
        assert!(store.get_content(&RefSpec::named("v1"), &key("a")).unwrap().is_some());
        assert!(store.get_content(&main_branch(), &key("a")).unwrap().is_none());

        let report = store.verify_history(&main_branch()).unwrap();
        assert_eq!(report.commits_checked, 2);

        let with_meta = store.list_references_with_metadata(None).unwrap();
        assert_eq!(with_meta.len(), 2);
        assert!(with_meta.iter().all(|info| info.metadata.is_some()));

        let err = store
            .delete_reference("main", RefType::Branch, store.default_branch().unwrap().hash)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        store.delete_reference("v1", RefType::Tag, h1).unwrap();
        assert_eq!(
            store.get_reference("v1").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    // ---- Test 10: Repositories sharing a backend are isolated ----
    #[test]
    fn repositories_are_isolated() {
        let backend: Arc<dyn CommitGraph> = Arc::new(InMemoryCommitGraph::new());
        let a = VersionStore::new(backend.clone(), "tenant-a".into(), VersionStoreConfig::default())
            .unwrap();
        let b =
            VersionStore::new(backend, "tenant-b".into(), VersionStoreConfig::default()).unwrap();
        a.init().unwrap();
        b.init().unwrap();

        let head = a
            .commit(
                "main",
                None,
                vec![Operation::put(key("x"), table(1))],
                CommitMeta::message("x"),
            )
            .unwrap()
            .hash;
        assert!(b.default_branch().unwrap().hash.is_no_ancestor());
        assert_eq!(
            b.resolve(&RefSpec::detached(head)).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn invalid_config_rejected() {
        let backend: Arc<dyn CommitGraph> = Arc::new(InMemoryCommitGraph::new());
        let config = VersionStoreConfig {
            max_log_entries: 0,
            ..VersionStoreConfig::default()
        };
        let err = VersionStore::new(backend, RepositoryId::default(), config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
