//! Flat projections for virtualized rendering.
//!
//! Two projections of the same global order:
//!
//! - [`flatten`] maps the record snapshot straight to a depth-annotated
//!   list — no folder synthesis, no children arrays. Indentation alone
//!   conveys hierarchy, which is what a virtualized list view wants.
//! - [`flatten_visible`] walks an already-built forest and lists the rows
//!   a collapsible tree view actually shows: folders always, children only
//!   under expanded folders.
//!
//! The leaf order of [`flatten`] is exactly the in-order leaf traversal of
//! [`crate::tree::build`] on the same snapshot — both go through the same
//! sorted, validated sequence.

use std::collections::HashSet;

use pagetree_core::record::PageRecord;

use crate::sorted_valid;
use crate::tree::{FolderId, Node};

/// One row of the flat projection: a record and its indentation depth.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FlatItem {
    /// The projected record (owned copy of the snapshot row).
    pub record: PageRecord,
    /// Number of ancestor segments in the record's path.
    pub depth: usize,
}

/// Project a snapshot to a depth-annotated flat list in global order.
///
/// Applies the same malformed-record skipping as the tree builder, so the
/// two projections always agree on which records exist.
#[must_use]
pub fn flatten(records: &[PageRecord]) -> Vec<FlatItem> {
    sorted_valid(records)
        .into_iter()
        .map(|sr| FlatItem {
            depth: sr.path.depth(),
            record: sr.record.clone(),
        })
        .collect()
}

/// The set of folders a user has expanded.
///
/// Pure data handed in by the caller per projection; the engine keeps no
/// UI state between calls. Folders absent from the set are collapsed.
/// Serializable under the `serde` feature so a client can persist it
/// per device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpandedSet {
    expanded: HashSet<FolderId>,
}

impl ExpandedSet {
    /// Empty set: everything collapsed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a folder expanded.
    pub fn expand(&mut self, id: FolderId) {
        self.expanded.insert(id);
    }

    /// Mark a folder collapsed.
    pub fn collapse(&mut self, id: &FolderId) {
        self.expanded.remove(id);
    }

    /// Flip a folder's state.
    pub fn toggle(&mut self, id: FolderId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Whether a folder is expanded.
    #[must_use]
    pub fn is_expanded(&self, id: &FolderId) -> bool {
        self.expanded.contains(id)
    }

    /// Number of expanded folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Whether no folder is expanded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl FromIterator<FolderId> for ExpandedSet {
    fn from_iter<I: IntoIterator<Item = FolderId>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

/// One visible row of a collapsible tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow<'a> {
    /// The forest node shown on this row.
    pub node: &'a Node,
    /// Indentation depth within the forest.
    pub depth: usize,
}

/// The rows a collapsible tree view shows for this forest and expansion
/// state, in display order.
///
/// Folder rows are always listed; a collapsed folder hides its entire
/// subtree. A folder split into several runs by interleaved keys shares
/// one expansion state across all runs (same [`FolderId`]).
#[must_use]
pub fn flatten_visible<'a>(forest: &'a [Node], expanded: &ExpandedSet) -> Vec<VisibleRow<'a>> {
    let mut out = Vec::new();
    visible_walk(forest, expanded, 0, &mut out);
    out
}

fn visible_walk<'a>(
    nodes: &'a [Node],
    expanded: &ExpandedSet,
    depth: usize,
    out: &mut Vec<VisibleRow<'a>>,
) {
    for node in nodes {
        out.push(VisibleRow { node, depth });
        if let Node::Folder(folder) = node {
            if expanded.is_expanded(&folder.id) {
                visible_walk(&folder.children, expanded, depth + 1, out);
            }
        }
    }
}
