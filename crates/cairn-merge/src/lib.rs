//! Merge engine for the Cairn version store.
//!
//! Implements merge (replay everything since the common ancestor) and
//! transplant (replay an explicit, contiguous list of commits) with per-key
//! conflict detection and NORMAL / FORCE / DROP resolution.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{classify, MergeEngine};
pub use error::{MergeError, Result};
pub use types::{KeyDetails, MergeOptions, MergeResult};
