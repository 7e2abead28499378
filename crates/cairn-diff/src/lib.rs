//! Diff engine for the Cairn version store.
//!
//! Compares the content visible at two commits key by key, lists the keys
//! at a commit (optionally collapsed to a namespace depth) and fetches the
//! content of several keys at once.
//!
//! # Key Types
//!
//! - [`DiffEngine`] -- Entry point bound to one repository
//! - [`DiffEntry`] -- A key whose content differs, with both sides
//! - [`KeyEntry`] -- A key visible at a commit

pub mod content_diff;
pub mod engine;
pub mod entries;
pub mod error;

pub use content_diff::{diff_listings, DiffEntry};
pub use engine::DiffEngine;
pub use entries::{collect_entries, KeyEntry};
pub use error::{DiffError, DiffResult};
