//! Key-level diff: compare the contents visible at two commits.
//!
//! Both sides are sorted `(key, content)` listings as returned by
//! [`CommitGraph::entries_at`](cairn_store::CommitGraph::entries_at). Keys
//! with identical content on both sides are omitted.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use cairn_types::{Content, ContentKey};

/// One key whose content differs between two commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub key: ContentKey,
    /// Content on the `from` side; `None` if the key was added.
    pub from: Option<Content>,
    /// Content on the `to` side; `None` if the key was removed.
    pub to: Option<Content>,
}

impl DiffEntry {
    pub fn is_added(&self) -> bool {
        self.from.is_none()
    }

    pub fn is_removed(&self) -> bool {
        self.to.is_none()
    }

    pub fn is_modified(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

/// Merge-join two key-sorted listings into the keys that differ, in key
/// order.
pub fn diff_listings(
    from: &[(ContentKey, Content)],
    to: &[(ContentKey, Content)],
) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < from.len() || j < to.len() {
        let order = match (from.get(i), to.get(j)) {
            (Some((a, _)), Some((b, _))) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, _) => Ordering::Greater,
        };
        match order {
            Ordering::Less => {
                let (key, content) = &from[i];
                out.push(DiffEntry {
                    key: key.clone(),
                    from: Some(content.clone()),
                    to: None,
                });
                i += 1;
            }
            Ordering::Greater => {
                let (key, content) = &to[j];
                out.push(DiffEntry {
                    key: key.clone(),
                    from: None,
                    to: Some(content.clone()),
                });
                j += 1;
            }
            Ordering::Equal => {
                let (key, old) = &from[i];
                let (_, new) = &to[j];
                if old != new {
                    out.push(DiffEntry {
                        key: key.clone(),
                        from: Some(old.clone()),
                        to: Some(new.clone()),
                    });
                }
                i += 1;
                j += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::ContentType;
    use serde_json::json;

    fn table(v: i64) -> Content {
        Content::new(ContentType::IcebergTable, json!({ "v": v }))
    }

    fn listing(pairs: &[(&str, &Content)]) -> Vec<(ContentKey, Content)> {
        let mut out: Vec<_> = pairs
            .iter()
            .map(|(k, c)| (ContentKey::of(&[k]), (*c).clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    #[test]
    fn identical_listings_have_no_diff() {
        let a = table(1);
        let side = listing(&[("a", &a)]);
        assert!(diff_listings(&side, &side).is_empty());
    }

    #[test]
    fn added_removed_and_modified_in_key_order() {
        let kept = table(1);
        let old = table(2);
        let new = old.updated(json!({ "v": 3 }));
        let gone = table(4);
        let fresh = table(5);

        let from = listing(&[("b", &old), ("c", &gone), ("k", &kept)]);
        let to = listing(&[("a", &fresh), ("b", &new), ("k", &kept)]);
        let diff = diff_listings(&from, &to);

        let keys: Vec<String> = diff.iter().map(|d| d.key.to_string()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(diff[0].is_added());
        assert!(diff[1].is_modified());
        assert_eq!(diff[1].to, Some(new));
        assert!(diff[2].is_removed());
    }

    #[test]
    fn empty_side() {
        let a = table(1);
        let side = listing(&[("a", &a)]);
        assert_eq!(diff_listings(&[], &side).len(), 1);
        assert!(diff_listings(&side, &[])[0].is_removed());
    }
}
