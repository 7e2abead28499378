//! Commit ancestry for the Cairn version store.
//!
//! Provides lazy first-parent walks, bounded common-ancestor search, commit
//! range collection for merge and transplant, and chain integrity checks.

pub mod dag;
pub mod error;
pub mod integrity;

pub use dag::{CommitDag, HashChain};
pub use error::{DagError, DagResult};
pub use integrity::IntegrityReport;
