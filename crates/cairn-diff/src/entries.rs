//! Key listings at a commit, optionally collapsed to a namespace depth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cairn_types::{predicate, Content, ContentId, ContentKey, ContentType, Predicate};

use crate::error::DiffResult;

/// A key visible at a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub key: ContentKey,
    pub content_type: ContentType,
    /// `None` for namespaces implied by truncation.
    pub content_id: Option<ContentId>,
}

impl KeyEntry {
    fn of(key: &ContentKey, content: &Content) -> Self {
        Self {
            key: key.clone(),
            content_type: content.content_type.clone(),
            content_id: Some(content.id.clone()),
        }
    }

    fn implied_namespace(key: ContentKey) -> Self {
        Self {
            key,
            content_type: ContentType::Namespace,
            content_id: None,
        }
    }
}

/// Turn a key-sorted listing into entries.
///
/// With `namespace_depth`, keys longer than the depth are cut to it and
/// reported once as [`ContentType::Namespace`]; a stored object under the
/// same key takes precedence. The filter sees the entries as reported.
pub fn collect_entries(
    listing: &[(ContentKey, Content)],
    filter: Option<&dyn Predicate<KeyEntry>>,
    namespace_depth: Option<usize>,
) -> DiffResult<Vec<KeyEntry>> {
    let mut entries: BTreeMap<ContentKey, KeyEntry> = BTreeMap::new();
    for (key, content) in listing {
        let entry = match namespace_depth {
            Some(depth) if depth > 0 && key.element_count() > depth => {
                KeyEntry::implied_namespace(key.truncate(depth))
            }
            _ => KeyEntry::of(key, content),
        };
        match entries.get(&entry.key) {
            Some(existing) if existing.content_id.is_some() => continue,
            Some(_) if entry.content_id.is_none() => continue,
            _ => {}
        }
        entries.insert(entry.key.clone(), entry);
    }

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries.into_values() {
        if predicate::matches(filter, &entry)? {
            out.push(entry);
        }
    }
    Ok(out)
}
