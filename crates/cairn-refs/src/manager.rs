//! The reference manager: named pointers into the commit graph.
//!
//! Every mutation is a compare-and-swap against the backend, so a caller
//! always states which hash it believes a reference points to.

use tracing::{debug, info};

use cairn_dag::CommitDag;
use cairn_store::ScopedGraph;
use cairn_types::{predicate, Hash, NamedRef, Predicate, RefType, Reference};

use crate::error::{RefError, Result};
use crate::names::validate_reference_name;
use crate::spec::RefSpec;
use crate::types::{ReferenceInfo, ReferenceMetadata};

/// Creates, moves, deletes and resolves references of one repository.
#[derive(Clone, Debug)]
pub struct ReferenceManager {
    graph: ScopedGraph,
    dag: CommitDag,
    default_branch: String,
}

impl ReferenceManager {
    pub fn new(graph: ScopedGraph, default_branch: impl Into<String>, max_walk: usize) -> Self {
        Self {
            dag: CommitDag::new(graph.clone(), max_walk),
            graph,
            default_branch: default_branch.into(),
        }
    }

    pub fn default_branch_name(&self) -> &str {
        &self.default_branch
    }

    /// Look up a reference by name, whatever its type.
    pub fn get(&self, name: &str) -> Result<Reference> {
        self.graph
            .get_reference(name)?
            .ok_or_else(|| RefError::NotFound {
                name: name.to_string(),
            })
    }

    /// Look up a branch by name. Tags and missing names are `NotFound`.
    pub fn get_branch(&self, name: &str) -> Result<Reference> {
        match self.get(name)? {
            reference if reference.named_ref.is_branch() => Ok(reference),
            _ => Err(RefError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// The configured default branch.
    pub fn default_branch(&self) -> Result<Reference> {
        self.get_branch(&self.default_branch)
    }

    /// Resolve a spec to a reference and the hash it designates.
    ///
    /// Embedded hashes must exist; they are not required to be reachable
    /// from the named reference.
    pub fn resolve(&self, spec: &RefSpec) -> Result<Reference> {
        let resolved = match (&spec.name, spec.hash) {
            (Some(name), None) => self.get(name)?,
            (Some(name), Some(hash)) => {
                let reference = self.get(name)?;
                self.ensure_commit(hash)?;
                Reference::new(reference.named_ref, hash)
            }
            (None, Some(hash)) => {
                self.ensure_commit(hash)?;
                Reference::new(NamedRef::Detached, hash)
            }
            (None, None) => {
                return Err(RefError::InvalidSpec {
                    spec: String::new(),
                    reason: "neither name nor hash given".into(),
                })
            }
        };
        debug!(spec = %spec, hash = %resolved.hash.short_hex(), "resolved reference");
        Ok(resolved)
    }

    /// Parse and resolve a textual spec.
    pub fn resolve_str(&self, spec: &str) -> Result<Reference> {
        self.resolve(&RefSpec::parse(spec)?)
    }

    /// Create a reference.
    ///
    /// A branch without a source starts at the root. A tag always needs one.
    pub fn create(
        &self,
        name: &str,
        ref_type: RefType,
        source: Option<&RefSpec>,
    ) -> Result<Reference> {
        validate_reference_name(name)?;

        let hash = match (source, ref_type) {
            (Some(spec), _) => self.resolve(spec)?.hash,
            (None, RefType::Branch) => Hash::NO_ANCESTOR,
            (None, RefType::Tag) => {
                return Err(RefError::TagRequiresTarget {
                    name: name.to_string(),
                })
            }
        };

        let reference = Reference::new(NamedRef::of(ref_type, name), hash);
        self.graph.create_reference(&reference)?;
        info!(reference = %reference.named_ref, hash = %hash.short_hex(), "created reference");
        Ok(reference)
    }

    /// Point `name` at `target`, provided it is still at `expected`.
    pub fn assign(
        &self,
        name: &str,
        ref_type: RefType,
        expected: Hash,
        target: &RefSpec,
    ) -> Result<Reference> {
        let named_ref = NamedRef::of(ref_type, name);
        let hash = self.resolve(target)?.hash;
        self.graph.cas_reference(&named_ref, expected, hash)?;
        info!(
            reference = %named_ref,
            from = %expected.short_hex(),
            to = %hash.short_hex(),
            "assigned reference"
        );
        Ok(Reference::new(named_ref, hash))
    }

    /// Delete `name`, provided it is still at `expected`.
    pub fn delete(&self, name: &str, ref_type: RefType, expected: Hash) -> Result<()> {
        if ref_type == RefType::Branch && name == self.default_branch {
            return Err(RefError::DeleteDefaultBranch {
                name: name.to_string(),
            });
        }
        let named_ref = NamedRef::of(ref_type, name);
        self.graph.delete_reference(&named_ref, expected)?;
        info!(reference = %named_ref, hash = %expected.short_hex(), "deleted reference");
        Ok(())
    }

    /// All references accepted by `filter`, sorted by name.
    pub fn list(&self, filter: Option<&dyn Predicate<Reference>>) -> Result<Vec<Reference>> {
        let mut matched = Vec::new();
        for reference in self.graph.list_references()? {
            if predicate::matches(filter, &reference)? {
                matched.push(reference);
            }
        }
        Ok(matched)
    }

    /// Like [`list`](Self::list), attaching metadata relative to the default
    /// branch. Metadata is omitted when the default branch does not exist.
    pub fn list_with_metadata(
        &self,
        filter: Option<&dyn Predicate<Reference>>,
    ) -> Result<Vec<ReferenceInfo>> {
        let base = match self.default_branch() {
            Ok(base) => Some(base),
            Err(RefError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        self.list(filter)?
            .into_iter()
            .map(|reference| {
                let metadata = match &base {
                    Some(base) => Some(self.metadata_against(&reference, base)?),
                    None => None,
                };
                Ok(ReferenceInfo {
                    reference,
                    metadata,
                })
            })
            .collect()
    }

    /// Compare `reference` with the default branch.
    pub fn metadata(&self, reference: &Reference) -> Result<ReferenceMetadata> {
        let base = self.default_branch()?;
        self.metadata_against(reference, &base)
    }

    fn metadata_against(
        &self,
        reference: &Reference,
        base: &Reference,
    ) -> Result<ReferenceMetadata> {
        let common_ancestor = self.dag.common_ancestor(reference.hash, base.hash)?;
        let ahead = self.dag.commits_between(common_ancestor, reference.hash)?.len();
        let behind = self.dag.commits_between(common_ancestor, base.hash)?.len();
        let head_meta = self.graph.get_commit(&reference.hash)?.map(|c| c.meta);
        Ok(ReferenceMetadata {
            head_meta,
            num_total_commits: self.dag.count_commits(reference.hash)?,
            common_ancestor,
            ahead,
            behind,
        })
    }

    fn ensure_commit(&self, hash: Hash) -> Result<()> {
        if self.graph.contains_commit(&hash)? {
            Ok(())
        } else {
            Err(RefError::HashNotFound(hash))
        }
    }
}
