//! Tree builder: from a flat snapshot to a rooted forest.
//!
//! Folders do not exist in the record collection — they are synthesized
//! here from shared path prefixes, in a single linear walk over the
//! globally sorted sequence. The global order is authoritative: a folder
//! appears at the position of its first descendant, and if a folder's
//! descendants interleave with outside keys, the folder materializes once
//! per contiguous run rather than pulling records out of numeric sequence
//! ("no folder magnetism").
//!
//! # Design Invariants
//!
//! 1. **Determinism**: the same snapshot always builds a structurally
//!    identical forest (folder identity is the literal prefix path).
//! 2. **No empty folders**: a folder node exists only if at least one leaf
//!    sits under it, directly or transitively.
//! 3. **Global order wins**: the in-order leaf traversal of the forest is
//!    exactly the globally sorted record sequence.
//! 4. **Exclusive ownership**: every node has exactly one parent.
//!
//! Duplicate full paths are valid data (page identity is by id, not path)
//! and land as siblings in comparator order.

use std::collections::HashMap;
use std::fmt;

use pagetree_core::record::PageRecord;

use crate::{SortedRecord, sorted_valid};

#[cfg(feature = "tracing")]
use std::time::Instant;

/// Deterministic identity of a synthetic folder: its full ancestor path.
///
/// A distinct type rather than a hashed id — collision with page ids is
/// ruled out at the type level, and the literal path reproduces across
/// rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FolderId(String);

impl FolderId {
    /// Wrap a full folder path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The folder's full path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of any forest node, page or folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// A page record id.
    Page(String),
    /// A synthetic folder id.
    Folder(FolderId),
}

/// A synthetic folder node.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    /// Identity, derived from the full prefix path.
    pub id: FolderId,
    /// Final path segment (display name).
    pub name: String,
    /// Inherited minimum ordering key among descendants at synthesis time,
    /// so the folder sorts at the position of its first child.
    pub ordering_key: f64,
    /// Id of the first leaf record under this prefix in global order.
    pub first_descendant: String,
    /// Id of the last leaf record under this prefix in global order.
    pub last_descendant: String,
    /// Ordered children; exclusive ownership.
    pub children: Vec<Node>,
}

impl FolderNode {
    /// The folder's full path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.id.as_str()
    }
}

/// A leaf node wrapping exactly one page record.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLeafNode {
    /// The wrapped record (owned copy of the snapshot row).
    pub record: PageRecord,
}

impl PageLeafNode {
    /// The page's own name: the final path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.record
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&self.record.path)
    }
}

/// One node of the navigation forest.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Synthetic folder.
    Folder(FolderNode),
    /// Page leaf.
    Page(PageLeafNode),
}

impl Node {
    /// Full path of the node (folder prefix or record path).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Node::Folder(f) => f.path(),
            Node::Page(p) => &p.record.path,
        }
    }

    /// Display name: the final path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Folder(f) => &f.name,
            Node::Page(p) => p.name(),
        }
    }

    /// Ordering key the node sorts by.
    #[must_use]
    pub fn ordering_key(&self) -> f64 {
        match self {
            Node::Folder(f) => f.ordering_key,
            Node::Page(p) => p.record.ordering_key,
        }
    }

    /// Whether this is a synthetic folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    /// Node identity.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Node::Folder(f) => NodeId::Folder(f.id.clone()),
            Node::Page(p) => NodeId::Page(p.record.id.clone()),
        }
    }

    /// Downcast to a folder.
    #[must_use]
    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Node::Folder(f) => Some(f),
            Node::Page(_) => None,
        }
    }

    /// Downcast to a page leaf.
    #[must_use]
    pub fn as_page(&self) -> Option<&PageLeafNode> {
        match self {
            Node::Page(p) => Some(p),
            Node::Folder(_) => None,
        }
    }
}

/// Root-level nodes of the navigation tree.
pub type Forest = Vec<Node>;

/// First/last leaf ids seen for a folder prefix during the tracking pass.
struct LeafSpan {
    first: String,
    last: String,
}

/// Build the navigation forest from a record snapshot.
///
/// Malformed records are skipped with a diagnostic; empty input yields an
/// empty forest. Pure and idempotent: rebuilding from the same snapshot
/// yields a structurally equal forest.
#[must_use]
pub fn build(records: &[PageRecord]) -> Forest {
    #[cfg(feature = "tracing")]
    let start = Instant::now();

    let sorted = sorted_valid(records);
    let spans = track_leaf_spans(&sorted);

    let mut roots: Forest = Vec::new();
    // Chain of currently open folders, outermost first.
    let mut open: Vec<FolderNode> = Vec::new();
    let mut prev_ancestors: Vec<String> = Vec::new();

    for sr in &sorted {
        let ancestors = sr.path.ancestors();
        let common = common_prefix_len(&prev_ancestors, ancestors);

        // Close folders the current record no longer lives under.
        while open.len() > common {
            let Some(done) = open.pop() else { break };
            attach(&mut open, &mut roots, Node::Folder(done));
        }

        // Open a folder for every new ancestor segment.
        for depth in common..ancestors.len() {
            let prefix = sr.path.prefix(depth + 1);
            let (first, last) = match spans.get(&prefix) {
                Some(span) => (span.first.clone(), span.last.clone()),
                None => (sr.record.id.clone(), sr.record.id.clone()),
            };
            open.push(FolderNode {
                id: FolderId::new(prefix),
                name: ancestors[depth].clone(),
                ordering_key: sr.record.ordering_key,
                first_descendant: first,
                last_descendant: last,
                children: Vec::new(),
            });
        }

        let leaf = Node::Page(PageLeafNode {
            record: sr.record.clone(),
        });
        attach(&mut open, &mut roots, leaf);

        prev_ancestors = ancestors.to_vec();
    }

    // Close whatever is still open after the last record.
    while let Some(done) = open.pop() {
        attach(&mut open, &mut roots, Node::Folder(done));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = "tree.build",
        records = records.len(),
        kept = sorted.len(),
        skipped = records.len() - sorted.len(),
        roots = roots.len(),
        build_duration_us = start.elapsed().as_micros() as u64,
    );

    roots
}

/// Pass 1: first/last leaf id per folder prefix, in global order.
///
/// Records arrive already sorted, so the first sighting of a prefix gives
/// the first leaf and every later sighting overwrites the last.
fn track_leaf_spans(sorted: &[SortedRecord<'_>]) -> HashMap<String, LeafSpan> {
    let mut spans: HashMap<String, LeafSpan> = HashMap::new();
    for sr in sorted {
        for depth in 1..=sr.path.ancestors().len() {
            let prefix = sr.path.prefix(depth);
            spans
                .entry(prefix)
                .and_modify(|span| span.last = sr.record.id.clone())
                .or_insert_with(|| LeafSpan {
                    first: sr.record.id.clone(),
                    last: sr.record.id.clone(),
                });
        }
    }
    spans
}

fn common_prefix_len(a: &[String], b: &[String]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Append a node to the innermost open folder, or to the root level.
fn attach(open: &mut [FolderNode], roots: &mut Forest, node: Node) {
    match open.last_mut() {
        Some(folder) => folder.children.push(node),
        None => roots.push(node),
    }
}

/// In-order leaf traversal: the records exactly as the flat projection
/// would list them.
#[must_use]
pub fn leaves(forest: &[Node]) -> Vec<&PageLeafNode> {
    let mut out = Vec::new();
    collect_leaves(forest, &mut out);
    out
}

fn collect_leaves<'a>(nodes: &'a [Node], out: &mut Vec<&'a PageLeafNode>) {
    for node in nodes {
        match node {
            Node::Page(leaf) => out.push(leaf),
            Node::Folder(folder) => collect_leaves(&folder.children, out),
        }
    }
}

/// Every materialized run of the folder with the given identity, in
/// traversal order.
///
/// Interleaved ordering keys can split one logical folder into several
/// contiguous runs; callers that need the whole subtree (the relocation
/// planner) visit all of them.
#[must_use]
pub fn folders_by_id<'a>(forest: &'a [Node], id: &FolderId) -> Vec<&'a FolderNode> {
    let mut out = Vec::new();
    collect_folders(forest, id, &mut out);
    out
}

fn collect_folders<'a>(nodes: &'a [Node], id: &FolderId, out: &mut Vec<&'a FolderNode>) {
    for node in nodes {
        if let Node::Folder(folder) = node {
            if folder.id == *id {
                out.push(folder);
            }
            collect_folders(&folder.children, id, out);
        }
    }
}
