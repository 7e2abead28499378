//! High-level SDK for the Cairn version store.
//!
//! [`VersionStore`] binds one repository of a [`CommitGraph`] backend to a
//! [`VersionStoreConfig`] and exposes references, commits, history, merge,
//! transplant and diff through a single handle. This is the main entry point
//! for applications embedding Cairn.

pub mod config;
pub mod error;
pub mod version_store;

pub use config::VersionStoreConfig;
pub use error::{VersionStoreError, VersionStoreResult};
pub use version_store::VersionStore;

// Re-export the types callers need to drive the facade.
pub use cairn_dag::IntegrityReport;
pub use cairn_diff::{DiffEntry, KeyEntry};
pub use cairn_log::{FetchOption, LogEntry, LogPage, LogRequest};
pub use cairn_merge::{KeyDetails, MergeOptions, MergeResult};
pub use cairn_refs::{RefSpec, ReferenceInfo, ReferenceMetadata};
pub use cairn_store::{CommitGraph, InMemoryCommitGraph, RepositoryId};
pub use cairn_types::{
    Commit, CommitMeta, ConflictType, Content, ContentId, ContentKey, ContentType, ErrorKind,
    Hash, MergeBehavior, NamedRef, Operation, Predicate, PredicateError, RefType, Reference,
};
