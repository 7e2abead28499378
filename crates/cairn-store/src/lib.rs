//! Commit graph storage for the Cairn version store.
//!
//! This crate defines the contract every storage backend fulfils and ships
//! the in-memory reference backend.
//!
//! # Storage Backends
//!
//! All backends implement the [`CommitGraph`] trait:
//!
//! - [`InMemoryCommitGraph`] -- `HashMap`-based graph for tests and embedding
//!
//! # Design Rules
//!
//! 1. Commits are immutable once appended; their hash is derived from content.
//! 2. Reference updates are compare-and-swap and the only serialization point.
//! 3. Every call names its repository explicitly ([`RepositoryId`]).
//! 4. Ancestry walks are lazy; dropping the iterator ends the walk.

pub mod error;
pub mod memory;
pub mod repository;
pub mod scoped;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryCommitGraph;
pub use repository::RepositoryId;
pub use scoped::ScopedGraph;
pub use traits::{CommitGraph, CommitIter, ParentWalk};
