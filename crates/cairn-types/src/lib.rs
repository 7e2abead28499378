//! Foundation types for the Cairn version store.
//!
//! Every other Cairn crate depends on `cairn-types`. It defines the data
//! model shared by the engines and the storage backend.
//!
//! # Key Types
//!
//! - [`Hash`] -- BLAKE3 commit hash, with [`Hash::NO_ANCESTOR`] as the root state
//! - [`ContentKey`] -- Hierarchical key addressing a content object
//! - [`Content`] -- Typed, opaque payload with a stable [`ContentId`]
//! - [`Operation`] -- Put / Delete / Unchanged carried by a commit
//! - [`Commit`] and [`CommitMeta`] -- Immutable commit-graph nodes
//! - [`NamedRef`] and [`Reference`] -- Branches, tags, and detached hashes
//! - [`MergeBehavior`] and [`ConflictType`] -- Per-key merge policy and outcome
//! - [`ErrorKind`] -- Caller-facing error classification

pub mod commit;
pub mod content;
pub mod error;
pub mod hash;
pub mod hasher;
pub mod key;
pub mod merge;
pub mod operation;
pub mod predicate;
pub mod reference;

pub use commit::{Commit, CommitDraft, CommitMeta, MERGE_PARENT_PROPERTY};
pub use content::{Content, ContentId, ContentType};
pub use error::{ErrorKind, TypeError};
pub use hash::Hash;
pub use hasher::ContentHasher;
pub use key::ContentKey;
pub use merge::{ConflictType, MergeBehavior};
pub use operation::Operation;
pub use predicate::{Predicate, PredicateError};
pub use reference::{NamedRef, RefType, Reference, DETACHED_REF_NAME};
