use std::sync::Arc;

use cairn_types::{Commit, CommitDraft, Content, ContentKey, Hash, NamedRef, Reference};

use crate::error::StoreResult;
use crate::repository::RepositoryId;
use crate::traits::{CommitGraph, CommitIter};

/// A [`CommitGraph`] bound to one repository.
///
/// Engines hold a `ScopedGraph` so they never have to thread the repository
/// id through their own signatures. Cloning is cheap.
#[derive(Clone)]
pub struct ScopedGraph {
    graph: Arc<dyn CommitGraph>,
    repo: RepositoryId,
}

impl ScopedGraph {
    pub fn new(graph: Arc<dyn CommitGraph>, repo: RepositoryId) -> Self {
        Self { graph, repo }
    }

    pub fn repository(&self) -> &RepositoryId {
        &self.repo
    }

    pub fn backend(&self) -> &Arc<dyn CommitGraph> {
        &self.graph
    }

    pub fn get_reference(&self, name: &str) -> StoreResult<Option<Reference>> {
        self.graph.get_reference(&self.repo, name)
    }

    pub fn list_references(&self) -> StoreResult<Vec<Reference>> {
        self.graph.list_references(&self.repo)
    }

    pub fn create_reference(&self, reference: &Reference) -> StoreResult<()> {
        self.graph.create_reference(&self.repo, reference)
    }

    pub fn cas_reference(
        &self,
        named_ref: &NamedRef,
        expected: Hash,
        new: Hash,
    ) -> StoreResult<()> {
        self.graph.cas_reference(&self.repo, named_ref, expected, new)
    }

    pub fn delete_reference(&self, named_ref: &NamedRef, expected: Hash) -> StoreResult<()> {
        self.graph.delete_reference(&self.repo, named_ref, expected)
    }

    pub fn append_commit(&self, draft: CommitDraft) -> StoreResult<Commit> {
        self.graph.append_commit(&self.repo, draft)
    }

    pub fn get_commit(&self, hash: &Hash) -> StoreResult<Option<Commit>> {
        self.graph.get_commit(&self.repo, hash)
    }

    pub fn contains_commit(&self, hash: &Hash) -> StoreResult<bool> {
        self.graph.contains_commit(&self.repo, hash)
    }

    pub fn get_content_at(&self, hash: &Hash, key: &ContentKey) -> StoreResult<Option<Content>> {
        self.graph.get_content_at(&self.repo, hash, key)
    }

    pub fn entries_at(&self, hash: &Hash) -> StoreResult<Vec<(ContentKey, Content)>> {
        self.graph.entries_at(&self.repo, hash)
    }

    pub fn walk_ancestry(&self, start: Hash) -> CommitIter<'_> {
        self.graph.walk_ancestry(&self.repo, start)
    }
}

impl std::fmt::Debug for ScopedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedGraph")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
