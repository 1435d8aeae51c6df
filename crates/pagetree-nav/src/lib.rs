#![forbid(unsafe_code)]

//! Navigation structures over ordered page records.
//!
//! Consumes a flat `&[PageRecord]` snapshot and produces the three things a
//! wiki navigation UI needs:
//!
//! - [`tree::build`] — a rooted forest of synthetic folders and page
//!   leaves for a collapsible tree view;
//! - [`flatten::flatten`] — a depth-annotated flat list for virtualized
//!   rendering (no folder synthesis);
//! - [`relocate::plan`] — a patch set relocating a dragged page or folder
//!   subtree without renumbering unrelated siblings.
//!
//! All three derive from the same global total order
//! ([`pagetree_core::order::compare`]), so the tree's in-order leaf
//! traversal, the flat projection, and the planner's neighbor bounds always
//! agree. Every entry point is a pure function of its inputs; callers own
//! snapshot immutability and write serialization.

pub mod flatten;
pub mod relocate;
pub mod tree;

pub use flatten::{ExpandedSet, FlatItem, VisibleRow, flatten, flatten_visible};
pub use relocate::{
    DragSource, DropPosition, DropSpot, PlanError, PlanErrorKind, RelocationPlan, plan,
};
pub use tree::{FolderId, FolderNode, Forest, Node, NodeId, PageLeafNode, build, leaves};

use pagetree_core::order;
use pagetree_core::path::PagePath;
use pagetree_core::record::PageRecord;

/// A record paired with its parsed path, in global sort order.
pub(crate) struct SortedRecord<'a> {
    pub(crate) path: PagePath,
    pub(crate) record: &'a PageRecord,
}

/// Parse, filter, and globally sort a snapshot.
///
/// Malformed paths are skipped with a diagnostic rather than failing the
/// whole snapshot: one bad record must not break navigation for the rest.
/// Every consumer in this crate goes through here, which is what keeps the
/// tree, the flat projection, and the planner's bounds consistent.
pub(crate) fn sorted_valid(records: &[PageRecord]) -> Vec<SortedRecord<'_>> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        match PagePath::parse(&record.path) {
            Ok(path) => out.push(SortedRecord { path, record }),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(message = "nav.record.skipped", id = %record.id, error = %_err);
            }
        }
    }
    out.sort_by(|a, b| order::compare(a.record, b.record));
    out
}
