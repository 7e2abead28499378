use std::collections::BTreeMap;

use tracing::debug;

use cairn_store::ScopedGraph;
use cairn_types::{Content, ContentKey, Hash, Predicate};

use crate::content_diff::{diff_listings, DiffEntry};
use crate::entries::{collect_entries, KeyEntry};
use crate::error::DiffResult;

/// Read-only comparisons and listings over one repository.
#[derive(Clone, Debug)]
pub struct DiffEngine {
    graph: ScopedGraph,
}

impl DiffEngine {
    pub fn new(graph: ScopedGraph) -> Self {
        Self { graph }
    }

    /// Keys whose content differs between `from` and `to`, sorted by key.
    pub fn diff(&self, from: &Hash, to: &Hash) -> DiffResult<Vec<DiffEntry>> {
        if from == to {
            // Still fail for an unknown hash.
            self.graph.entries_at(from)?;
            return Ok(Vec::new());
        }
        let old = self.graph.entries_at(from)?;
        let new = self.graph.entries_at(to)?;
        let diff = diff_listings(&old, &new);
        debug!(
            from = %from.short_hex(),
            to = %to.short_hex(),
            changed = diff.len(),
            "computed diff"
        );
        Ok(diff)
    }

    /// Keys visible at `hash`; see [`collect_entries`].
    pub fn entries(
        &self,
        hash: &Hash,
        filter: Option<&dyn Predicate<KeyEntry>>,
        namespace_depth: Option<usize>,
    ) -> DiffResult<Vec<KeyEntry>> {
        let listing = self.graph.entries_at(hash)?;
        collect_entries(&listing, filter, namespace_depth)
    }

    /// Content of several keys at `hash`. Absent keys are left out.
    pub fn contents(
        &self,
        hash: &Hash,
        keys: &[ContentKey],
    ) -> DiffResult<BTreeMap<ContentKey, Content>> {
        let mut out = BTreeMap::new();
        for key in keys {
            if let Some(content) = self.graph.get_content_at(hash, key)? {
                out.insert(key.clone(), content);
            }
        }
        Ok(out)
    }
}
