use serde::{Deserialize, Serialize};

use cairn_types::{CommitMeta, Hash, Operation};

/// How much of each commit a log entry carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOption {
    /// Hash, parents and metadata.
    #[default]
    Minimal,
    /// Additionally the commit's puts and deletes.
    All,
}

/// Parameters of one log page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRequest {
    /// Newest commit of the walk.
    pub start: Hash,
    /// Stop before reaching this commit (exclusive).
    pub bound: Option<Hash>,
    /// Maximum number of entries; clamped to the server cap.
    pub max_records: Option<usize>,
    /// Resume point from a previous page; replaces `start`.
    pub page_token: Option<Hash>,
    pub fetch: FetchOption,
}

impl LogRequest {
    pub fn new(start: Hash) -> Self {
        Self {
            start,
            bound: None,
            max_records: None,
            page_token: None,
            fetch: FetchOption::Minimal,
        }
    }

    pub fn with_bound(mut self, bound: Hash) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn with_page_token(mut self, token: Option<Hash>) -> Self {
        self.page_token = token;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchOption) -> Self {
        self.fetch = fetch;
        self
    }
}

/// One commit as seen by the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub hash: Hash,
    pub parent_hash: Hash,
    pub additional_parents: Vec<Hash>,
    pub meta: CommitMeta,
    /// Puts and deletes, present only with [`FetchOption::All`].
    pub operations: Option<Vec<Operation>>,
}

/// A page of log entries, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    pub has_more: bool,
    /// Hash of the next matching commit; pass it back as the page token.
    pub next_token: Option<Hash>,
}
