//! Paged commit history.
//!
//! The walker reads commits lazily from the newest to the oldest and stops
//! as soon as a page is full, so the cost of a page is proportional to the
//! commits it inspects, not to the length of the history.

use tracing::debug;

use cairn_store::ScopedGraph;
use cairn_types::{predicate, Commit, Hash, Operation, Predicate};

use crate::error::{LogError, LogResult};
use crate::types::{FetchOption, LogEntry, LogPage, LogRequest};

/// Default upper bound on entries per page.
pub const MAX_LOG_ENTRIES: usize = 250;

/// Serves commit log pages for one repository.
#[derive(Clone, Debug)]
pub struct HistoryWalker {
    graph: ScopedGraph,
    max_entries: usize,
}

impl HistoryWalker {
    /// `max_entries` caps every page regardless of what the caller asks for.
    pub fn new(graph: ScopedGraph, max_entries: usize) -> Self {
        Self { graph, max_entries }
    }

    /// Effective page size for a requested `max_records`.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n.min(self.max_entries),
            _ => self.max_entries,
        }
    }

    /// Read one page of history.
    pub fn log(
        &self,
        request: &LogRequest,
        filter: Option<&dyn Predicate<LogEntry>>,
    ) -> LogResult<LogPage> {
        let start = match request.page_token {
            Some(token) => {
                if !self.graph.contains_commit(&token)? {
                    return Err(LogError::PageTokenNotFound(token));
                }
                token
            }
            None => {
                if !self.graph.contains_commit(&request.start)? {
                    return Err(LogError::StartNotFound(request.start));
                }
                request.start
            }
        };
        let limit = self.page_size(request.max_records);

        let mut page = LogPage::default();
        let mut inspected = 0usize;
        for commit in self.graph.walk_ancestry(start) {
            let commit = commit?;
            if Some(commit.hash) == request.bound {
                break;
            }
            inspected += 1;

            let entry = to_entry(commit, request.fetch);
            if !predicate::matches(filter, &entry)? {
                continue;
            }
            if page.entries.len() == limit {
                page.has_more = true;
                page.next_token = Some(entry.hash);
                break;
            }
            page.entries.push(entry);
        }

        debug!(
            start = %start.short_hex(),
            inspected,
            returned = page.entries.len(),
            has_more = page.has_more,
            "read log page"
        );
        Ok(page)
    }
}

fn to_entry(commit: Commit, fetch: FetchOption) -> LogEntry {
    let operations = match fetch {
        FetchOption::Minimal => None,
        FetchOption::All => Some(
            commit
                .operations
                .into_iter()
                .filter(Operation::is_mutation)
                .collect(),
        ),
    };
    LogEntry {
        hash: commit.hash,
        parent_hash: commit.parent,
        additional_parents: commit.additional_parents,
        meta: commit.meta,
        operations,
    }
}

/// Reads every page of a log until it is exhausted.
///
/// The walk restarts from the returned token each time, exactly as a remote
/// client would.
pub fn collect_all_pages(
    walker: &HistoryWalker,
    request: &LogRequest,
    filter: Option<&dyn Predicate<LogEntry>>,
) -> LogResult<Vec<LogEntry>> {
    let mut entries = Vec::new();
    let mut request = request.clone();
    loop {
        let page = walker.log(&request, filter)?;
        entries.extend(page.entries);
        match page.next_token {
            Some(token) if page.has_more => request.page_token = Some(token),
            _ => return Ok(entries),
        }
    }
}

/// Hashes of `entries`, in order.
pub fn hashes(entries: &[LogEntry]) -> Vec<Hash> {
    entries.iter().map(|e| e.hash).collect()
}
