use cairn_types::{Commit, CommitDraft, Content, ContentKey, Hash, NamedRef, Reference};

use crate::error::{StoreError, StoreResult};
use crate::repository::RepositoryId;

/// Lazy stream of commits, child to parent.
pub type CommitIter<'a> = Box<dyn Iterator<Item = StoreResult<Commit>> + 'a>;

/// Storage contract for commits and references.
///
/// All implementations must satisfy these invariants:
/// - Commits are immutable once appended. Appending an identical draft twice
///   is a no-op that returns the existing commit.
/// - A commit's parent exists before the commit does (or is
///   [`Hash::NO_ANCESTOR`]).
/// - `cas_reference` and `delete_reference` are atomic: of several callers
///   presenting the same expected hash, exactly one succeeds.
/// - Reference names are unique across branches and tags.
/// - [`Hash::NO_ANCESTOR`] has no commit and an empty key space.
pub trait CommitGraph: Send + Sync {
    /// Read a reference by name, regardless of its type.
    fn get_reference(&self, repo: &RepositoryId, name: &str) -> StoreResult<Option<Reference>>;

    /// All references of the repository, sorted by name.
    fn list_references(&self, repo: &RepositoryId) -> StoreResult<Vec<Reference>>;

    /// Create a reference. Fails if any reference already uses the name.
    fn create_reference(&self, repo: &RepositoryId, reference: &Reference) -> StoreResult<()>;

    /// Move `named_ref` from `expected` to `new`.
    ///
    /// Fails with [`StoreError::ReferenceConflict`] if the reference is not at
    /// `expected`, and [`StoreError::ReferenceNotFound`] if no reference of
    /// that name and type exists.
    fn cas_reference(
        &self,
        repo: &RepositoryId,
        named_ref: &NamedRef,
        expected: Hash,
        new: Hash,
    ) -> StoreResult<()>;

    /// Delete `named_ref` if it is still at `expected`.
    fn delete_reference(
        &self,
        repo: &RepositoryId,
        named_ref: &NamedRef,
        expected: Hash,
    ) -> StoreResult<()>;

    /// Persist a new commit and return it with its computed hash.
    fn append_commit(&self, repo: &RepositoryId, draft: CommitDraft) -> StoreResult<Commit>;

    /// Read a commit by hash. `NO_ANCESTOR` never has a commit.
    fn get_commit(&self, repo: &RepositoryId, hash: &Hash) -> StoreResult<Option<Commit>>;

    /// Content stored under `key` at commit `hash`.
    fn get_content_at(
        &self,
        repo: &RepositoryId,
        hash: &Hash,
        key: &ContentKey,
    ) -> StoreResult<Option<Content>>;

    /// Every key and its content at commit `hash`, sorted by key.
    fn entries_at(&self, repo: &RepositoryId, hash: &Hash)
        -> StoreResult<Vec<(ContentKey, Content)>>;

    /// Returns `true` if `hash` names a commit or is `NO_ANCESTOR`.
    fn contains_commit(&self, repo: &RepositoryId, hash: &Hash) -> StoreResult<bool> {
        if hash.is_no_ancestor() {
            return Ok(true);
        }
        Ok(self.get_commit(repo, hash)?.is_some())
    }

    /// Walk the first-parent chain starting at `start` (inclusive).
    ///
    /// The walk is lazy: nothing is read until the iterator is advanced, and
    /// dropping it stops the traversal. It ends after the first commit of the
    /// history and yields nothing when `start` is `NO_ANCESTOR`.
    fn walk_ancestry<'a>(&'a self, repo: &RepositoryId, start: Hash) -> CommitIter<'a> {
        Box::new(ParentWalk::new(self, repo.clone(), start))
    }
}

/// First-parent walk over any [`CommitGraph`].
pub struct ParentWalk<'a, G: CommitGraph + ?Sized> {
    graph: &'a G,
    repo: RepositoryId,
    next: Option<Hash>,
}

impl<'a, G: CommitGraph + ?Sized> ParentWalk<'a, G> {
    pub fn new(graph: &'a G, repo: RepositoryId, start: Hash) -> Self {
        Self {
            graph,
            repo,
            next: (!start.is_no_ancestor()).then_some(start),
        }
    }
}

impl<G: CommitGraph + ?Sized> Iterator for ParentWalk<'_, G> {
    type Item = StoreResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;
        match self.graph.get_commit(&self.repo, &hash) {
            Ok(Some(commit)) => {
                if !commit.is_first() {
                    self.next = Some(commit.parent);
                }
                Some(Ok(commit))
            }
            Ok(None) => Some(Err(StoreError::CommitNotFound(hash))),
            Err(e) => Some(Err(e)),
        }
    }
}
