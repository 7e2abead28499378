//! Commit engine for the Cairn version store.
//!
//! [`CommitEngine::commit`] validates a batch of operations, checks branch
//! and per-key expectations, writes the commit and moves the branch with a
//! compare-and-swap.

pub mod engine;
pub mod error;

pub use engine::CommitEngine;
pub use error::{CommitError, Result};
