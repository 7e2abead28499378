//! In-memory commit graph for tests and embedding.
//!
//! [`InMemoryCommitGraph`] keeps every repository in a `HashMap` behind a
//! single `RwLock`. Each commit is stored together with the full key space
//! it produces, so point reads never replay history.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cairn_types::{
    Commit, CommitDraft, Content, ContentKey, Hash, NamedRef, Operation, Reference,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::RepositoryId;
use crate::traits::CommitGraph;

type Snapshot = Arc<BTreeMap<ContentKey, Content>>;

#[derive(Debug)]
struct StoredCommit {
    commit: Commit,
    snapshot: Snapshot,
}

#[derive(Debug, Default)]
struct RepoState {
    refs: BTreeMap<String, Reference>,
    commits: HashMap<Hash, StoredCommit>,
}

impl RepoState {
    fn snapshot(&self, hash: &Hash) -> StoreResult<Snapshot> {
        if hash.is_no_ancestor() {
            return Ok(Arc::new(BTreeMap::new()));
        }
        self.commits
            .get(hash)
            .map(|stored| Arc::clone(&stored.snapshot))
            .ok_or(StoreError::CommitNotFound(*hash))
    }

    fn check_named(&self, named_ref: &NamedRef) -> StoreResult<&Reference> {
        if named_ref.is_detached() {
            return Err(StoreError::InvalidReference(named_ref.to_string()));
        }
        match self.refs.get(named_ref.name()) {
            Some(existing) if &existing.named_ref == named_ref => Ok(existing),
            _ => Err(StoreError::ReferenceNotFound(named_ref.name().to_string())),
        }
    }
}

/// An in-memory implementation of [`CommitGraph`].
///
/// Data is lost when the graph is dropped. Repositories come into existence
/// on first write; reading an unknown repository behaves like reading an
/// empty one.
#[derive(Default)]
pub struct InMemoryCommitGraph {
    repos: RwLock<HashMap<RepositoryId, RepoState>>,
}

impl InMemoryCommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits stored for `repo`.
    pub fn commit_count(&self, repo: &RepositoryId) -> StoreResult<usize> {
        let repos = self.read()?;
        Ok(repos.get(repo).map_or(0, |state| state.commits.len()))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<RepositoryId, RepoState>>> {
        self.repos
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<RepositoryId, RepoState>>> {
        self.repos
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl CommitGraph for InMemoryCommitGraph {
    fn get_reference(&self, repo: &RepositoryId, name: &str) -> StoreResult<Option<Reference>> {
        let repos = self.read()?;
        Ok(repos.get(repo).and_then(|state| state.refs.get(name).cloned()))
    }

    fn list_references(&self, repo: &RepositoryId) -> StoreResult<Vec<Reference>> {
        let repos = self.read()?;
        Ok(repos
            .get(repo)
            .map(|state| state.refs.values().cloned().collect())
            .unwrap_or_default())
    }

    fn create_reference(&self, repo: &RepositoryId, reference: &Reference) -> StoreResult<()> {
        if reference.named_ref.is_detached() {
            return Err(StoreError::InvalidReference(reference.named_ref.to_string()));
        }
        let mut repos = self.write()?;
        let state = repos.entry(repo.clone()).or_default();
        if !reference.hash.is_no_ancestor() && !state.commits.contains_key(&reference.hash) {
            return Err(StoreError::CommitNotFound(reference.hash));
        }
        let name = reference.name().to_string();
        if state.refs.contains_key(&name) {
            return Err(StoreError::ReferenceAlreadyExists(name));
        }
        tracing::debug!(
            repo = %repo,
            reference = %reference.named_ref,
            hash = %reference.hash.short_hex(),
            "created reference"
        );
        state.refs.insert(name, reference.clone());
        Ok(())
    }

    fn cas_reference(
        &self,
        repo: &RepositoryId,
        named_ref: &NamedRef,
        expected: Hash,
        new: Hash,
    ) -> StoreResult<()> {
        let mut repos = self.write()?;
        let state = repos
            .get_mut(repo)
            .ok_or_else(|| StoreError::ReferenceNotFound(named_ref.name().to_string()))?;
        if !new.is_no_ancestor() && !state.commits.contains_key(&new) {
            return Err(StoreError::CommitNotFound(new));
        }
        let current = state.check_named(named_ref)?.hash;
        if current != expected {
            return Err(StoreError::ReferenceConflict {
                name: named_ref.name().to_string(),
                expected,
                actual: current,
            });
        }
        if let Some(reference) = state.refs.get_mut(named_ref.name()) {
            reference.hash = new;
        }
        tracing::debug!(
            repo = %repo,
            reference = %named_ref,
            from = %expected.short_hex(),
            to = %new.short_hex(),
            "moved reference"
        );
        Ok(())
    }

    fn delete_reference(
        &self,
        repo: &RepositoryId,
        named_ref: &NamedRef,
        expected: Hash,
    ) -> StoreResult<()> {
        let mut repos = self.write()?;
        let state = repos
            .get_mut(repo)
            .ok_or_else(|| StoreError::ReferenceNotFound(named_ref.name().to_string()))?;
        let current = state.check_named(named_ref)?.hash;
        if current != expected {
            return Err(StoreError::ReferenceConflict {
                name: named_ref.name().to_string(),
                expected,
                actual: current,
            });
        }
        state.refs.remove(named_ref.name());
        tracing::debug!(repo = %repo, reference = %named_ref, "deleted reference");
        Ok(())
    }

    fn append_commit(&self, repo: &RepositoryId, draft: CommitDraft) -> StoreResult<Commit> {
        let commit = draft.into_commit()?;
        let mut repos = self.write()?;
        let state = repos.entry(repo.clone()).or_default();

        if let Some(existing) = state.commits.get(&commit.hash) {
            return Ok(existing.commit.clone());
        }
        for parent in &commit.additional_parents {
            if !state.commits.contains_key(parent) {
                return Err(StoreError::CommitNotFound(*parent));
            }
        }

        let mut contents = (*state.snapshot(&commit.parent)?).clone();
        for op in &commit.operations {
            match op {
                Operation::Put { key, content, .. } => {
                    contents.insert(key.clone(), content.clone());
                }
                Operation::Delete { key } => {
                    contents.remove(key);
                }
                Operation::Unchanged { .. } => {}
            }
        }

        tracing::debug!(
            repo = %repo,
            commit = %commit.hash.short_hex(),
            parent = %commit.parent.short_hex(),
            ops = commit.operations.len(),
            "appended commit"
        );
        state.commits.insert(
            commit.hash,
            StoredCommit {
                commit: commit.clone(),
                snapshot: Arc::new(contents),
            },
        );
        Ok(commit)
    }

    fn get_commit(&self, repo: &RepositoryId, hash: &Hash) -> StoreResult<Option<Commit>> {
        let repos = self.read()?;
        Ok(repos
            .get(repo)
            .and_then(|state| state.commits.get(hash))
            .map(|stored| stored.commit.clone()))
    }

    fn get_content_at(
        &self,
        repo: &RepositoryId,
        hash: &Hash,
        key: &ContentKey,
    ) -> StoreResult<Option<Content>> {
        let snapshot = self.snapshot_of(repo, hash)?;
        Ok(snapshot.get(key).cloned())
    }

    fn entries_at(
        &self,
        repo: &RepositoryId,
        hash: &Hash,
    ) -> StoreResult<Vec<(ContentKey, Content)>> {
        let snapshot = self.snapshot_of(repo, hash)?;
        Ok(snapshot
            .iter()
            .map(|(key, content)| (key.clone(), content.clone()))
            .collect())
    }
}

impl InMemoryCommitGraph {
    /// The snapshot is cloned out as an `Arc` so the lock is released before
    /// the caller inspects it.
    fn snapshot_of(&self, repo: &RepositoryId, hash: &Hash) -> StoreResult<Snapshot> {
        let repos = self.read()?;
        match repos.get(repo) {
            Some(state) => state.snapshot(hash),
            None if hash.is_no_ancestor() => Ok(Arc::new(BTreeMap::new())),
            None => Err(StoreError::CommitNotFound(*hash)),
        }
    }
}

impl std::fmt::Debug for InMemoryCommitGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repos = self.repos.read().map(|r| r.len()).unwrap_or(0);
        f.debug_struct("InMemoryCommitGraph")
            .field("repositories", &repos)
            .finish()
    }
}
