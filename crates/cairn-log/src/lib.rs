//! Commit history for the Cairn version store.
//!
//! [`HistoryWalker::log`] returns bounded pages of commits, newest first,
//! optionally filtered by a caller-supplied [`Predicate`](cairn_types::Predicate).
//! A page that stops early hands back a token naming the next matching
//! commit; resuming from it yields every remaining match exactly once.

pub mod error;
pub mod types;
pub mod walker;

pub use error::{LogError, LogResult};
pub use types::{FetchOption, LogEntry, LogPage, LogRequest};
pub use walker::{collect_all_pages, HistoryWalker, MAX_LOG_ENTRIES};
