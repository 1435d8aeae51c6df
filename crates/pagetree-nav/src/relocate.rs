//! Relocation planning for drag-and-drop reordering.
//!
//! Given a dragged page or folder, a drop target, and a position, compute
//! the patch set that moves the dragged subtree — new parent path plus
//! fresh interpolated ordering keys — without touching any other record.
//! Fractional keys are the whole point: inserting between two neighbors
//! never renumbers the rest of the destination.
//!
//! # Invariants
//!
//! 1. Records outside the dragged set never appear in a plan.
//! 2. Relocating several records into one gap fans their keys out via a
//!    single interpolation, so siblings never collide (barring documented
//!    precision exhaustion).
//! 3. A folder dropped into its own subtree yields an `Ok` no-op plan —
//!    the cycle guard runs before any key arithmetic.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `PlanErrorKind::UnknownDragSource` | id not in snapshot/forest | Structured error |
//! | `PlanErrorKind::UnknownTarget` | target path not in destination | Structured error |
//! | `PlanErrorKind::MalformedTarget` | invalid target path string | Structured error |
//! | Cycle (folder into own subtree) | user gesture | `Ok` no-op plan |
//! | Collided neighbor keys | prior key exhaustion | Duplicate keys, caller renormalizes |

use std::collections::HashSet;
use std::fmt;

use pagetree_core::order;
use pagetree_core::path::{self, PagePath};
use pagetree_core::record::{PagePatch, PageRecord};

use crate::sorted_valid;
use crate::tree::{self, FolderId, Node};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A single page, by record id.
    Page(String),
    /// A folder and its entire subtree, by folder id.
    Folder(FolderId),
}

/// Where, relative to the target path, the drop lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    /// As the target's previous sibling.
    Before,
    /// As the target's next sibling.
    After,
    /// At the end of the target folder.
    Inside,
}

/// A drop target: a path in the forest plus a position relative to it.
///
/// For `Before`/`After` the path names an existing sibling (page or
/// folder); for `Inside` it names the destination folder itself, or `""`
/// for the root level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSpot {
    /// Target path.
    pub path: String,
    /// Position relative to the target.
    pub position: DropPosition,
}

impl DropSpot {
    /// Drop before the item at `path`.
    #[must_use]
    pub fn before(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            position: DropPosition::Before,
        }
    }

    /// Drop after the item at `path`.
    #[must_use]
    pub fn after(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            position: DropPosition::After,
        }
    }

    /// Drop at the end of the folder at `path` (`""` for root).
    #[must_use]
    pub fn inside(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            position: DropPosition::Inside,
        }
    }
}

/// Error classification for [`plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanErrorKind {
    /// The dragged id matches nothing in the snapshot or forest.
    UnknownDragSource,
    /// The target path matches nothing in the destination.
    UnknownTarget,
    /// The target path string is malformed.
    MalformedTarget,
}

/// A structured planning failure. These signal caller bugs (dangling ids,
/// bad paths); everything the engine can route around — cycles, collided
/// keys, empty destinations — is an `Ok` plan instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanError {
    kind: PlanErrorKind,
    detail: String,
}

impl PlanError {
    fn unknown_drag(detail: impl Into<String>) -> Self {
        Self {
            kind: PlanErrorKind::UnknownDragSource,
            detail: detail.into(),
        }
    }

    fn unknown_target(detail: impl Into<String>) -> Self {
        Self {
            kind: PlanErrorKind::UnknownTarget,
            detail: detail.into(),
        }
    }

    fn malformed_target(detail: impl Into<String>) -> Self {
        Self {
            kind: PlanErrorKind::MalformedTarget,
            detail: detail.into(),
        }
    }

    /// Error classification.
    #[must_use]
    pub fn kind(&self) -> PlanErrorKind {
        self.kind
    }

    /// Human-readable context (the offending id or path).
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PlanErrorKind::UnknownDragSource => {
                write!(f, "unknown drag source: {}", self.detail)
            }
            PlanErrorKind::UnknownTarget => write!(f, "unknown drop target: {}", self.detail),
            PlanErrorKind::MalformedTarget => {
                write!(f, "malformed drop target path: {:?}", self.detail)
            }
        }
    }
}

impl std::error::Error for PlanError {}

/// The computed relocation: one patch per dragged record, nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelocationPlan {
    /// Patches in the dragged set's global order.
    pub patches: Vec<PagePatch>,
}

impl RelocationPlan {
    /// The empty plan (rejected or pointless gesture).
    #[must_use]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Whether this plan changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.patches.is_empty()
    }

    /// Apply the patches to a snapshot copy, yielding the records as they
    /// will look once the caller has persisted and re-fetched.
    #[must_use]
    pub fn apply(&self, records: &[PageRecord]) -> Vec<PageRecord> {
        let mut out = records.to_vec();
        for patch in &self.patches {
            for rec in &mut out {
                if patch.apply_to(rec) {
                    break;
                }
            }
        }
        out
    }
}

/// Compute the relocation plan for a drag gesture.
///
/// `records` is the current snapshot and `forest` must be
/// [`tree::build`] of that same snapshot — the planner uses the forest to
/// enumerate a dragged folder's subtree and the destination's children,
/// and the raw records for neighbor key bounds.
pub fn plan(
    dragged: &DragSource,
    target: &DropSpot,
    records: &[PageRecord],
    forest: &[Node],
) -> Result<RelocationPlan, PlanError> {
    // Target path syntax first; "" is only meaningful as `Inside` (root).
    if target.path.is_empty() {
        if target.position != DropPosition::Inside {
            return Err(PlanError::malformed_target(target.path.clone()));
        }
    } else if PagePath::parse(&target.path).is_err() {
        return Err(PlanError::malformed_target(target.path.clone()));
    }

    // Resolve the dragged set, in global order.
    let (set, dragged_folder_path): (Vec<&PageRecord>, Option<&str>) = match dragged {
        DragSource::Page(id) => {
            let Some(rec) = records.iter().find(|r| r.id == *id) else {
                return Err(PlanError::unknown_drag(id.clone()));
            };
            // A record the builders skipped does not exist in any view,
            // so it cannot be dragged either.
            if PagePath::parse(&rec.path).is_err() {
                return Err(PlanError::unknown_drag(id.clone()));
            }
            (vec![rec], None)
        }
        DragSource::Folder(fid) => {
            let runs = tree::folders_by_id(forest, fid);
            if runs.is_empty() {
                return Err(PlanError::unknown_drag(fid.as_str()));
            }
            let mut set = Vec::new();
            for run in &runs {
                for leaf in tree::leaves(&run.children) {
                    set.push(&leaf.record);
                }
            }
            (set, Some(fid.as_str()))
        }
    };

    // Cycle guard: a folder cannot land in its own subtree.
    if let Some(folder_path) = dragged_folder_path {
        if path::contains(folder_path, &target.path) {
            #[cfg(feature = "tracing")]
            tracing::debug!(message = "relocate.plan.cycle", folder = folder_path, target = %target.path);
            return Ok(RelocationPlan::noop());
        }
    }

    // Destination folder: the target itself for Inside, its parent otherwise.
    let dest: String = match target.position {
        DropPosition::Inside => target.path.clone(),
        DropPosition::Before | DropPosition::After => {
            path::parent_of(&target.path).unwrap_or("").to_owned()
        }
    };

    let dragged_ids: HashSet<&str> = set.iter().map(|r| r.id.as_str()).collect();

    let (before_bound, after_bound) = match target.position {
        DropPosition::Inside => inside_bounds(&dest, records, forest, &dragged_ids)?,
        DropPosition::Before => sibling_bounds(
            &dest,
            &target.path,
            true,
            forest,
            &dragged_ids,
            dragged_folder_path,
        )?,
        DropPosition::After => sibling_bounds(
            &dest,
            &target.path,
            false,
            forest,
            &dragged_ids,
            dragged_folder_path,
        )?,
    };

    let keys = order::interpolate(before_bound, after_bound, set.len());

    // New path: strip the dragged root's parent prefix, prepend the
    // destination (leaf names and subtree shape preserved).
    let root_parent: Option<&str> = match dragged {
        DragSource::Page(_) => set.first().and_then(|r| path::parent_of(&r.path)),
        DragSource::Folder(fid) => path::parent_of(fid.as_str()),
    };
    let strip = root_parent.map_or(0, |p| p.len() + 1);

    let patches = set
        .iter()
        .zip(keys)
        .map(|(rec, key)| {
            let suffix = &rec.path[strip.min(rec.path.len())..];
            let new_path = if dest.is_empty() {
                suffix.to_owned()
            } else {
                format!("{dest}/{suffix}")
            };
            PagePatch {
                id: rec.id.clone(),
                new_path,
                new_ordering_key: key,
            }
        })
        .collect();

    let plan = RelocationPlan { patches };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = "relocate.plan",
        dragged = set.len(),
        dest = %dest,
        position = ?target.position,
        patches = plan.patches.len(),
    );

    Ok(plan)
}

/// Neighbor bounds for a drop at the end of `dest` (`""` = root).
///
/// The before-bound is the key of the destination's last non-dragged
/// descendant in global order; the after-bound is the key of the first
/// non-dragged record that follows it.
fn inside_bounds(
    dest: &str,
    records: &[PageRecord],
    forest: &[Node],
    dragged_ids: &HashSet<&str>,
) -> Result<(Option<f64>, Option<f64>), PlanError> {
    if !dest.is_empty() && tree::folders_by_id(forest, &FolderId::new(dest)).is_empty() {
        return Err(PlanError::unknown_target(dest));
    }

    let sorted = sorted_valid(records);
    let mut before = None;
    let mut last_idx = None;
    for (i, sr) in sorted.iter().enumerate() {
        let in_dest = dest.is_empty() || path::contains(dest, &sr.record.path);
        if in_dest && !dragged_ids.contains(sr.record.id.as_str()) {
            before = Some(sr.record.ordering_key);
            last_idx = Some(i);
        }
    }
    let after = last_idx.and_then(|i| {
        sorted[i + 1..]
            .iter()
            .find(|sr| !dragged_ids.contains(sr.record.id.as_str()))
            .map(|sr| sr.record.ordering_key)
    });
    Ok((before, after))
}

/// Neighbor bounds for a drop before/after a sibling within `dest`.
///
/// A child folder run occupies the contiguous key range of the leaves in
/// that run, so its block bounds come from the run's own first and last
/// leaf. A folder split by interleaved keys shares identity across runs
/// but not bounds: dropping next to one run must key into that run's
/// local gap, never across the whole logical folder. Children belonging
/// to the dragged set are skipped (same-folder reorder).
fn sibling_bounds(
    dest: &str,
    target_path: &str,
    before_target: bool,
    forest: &[Node],
    dragged_ids: &HashSet<&str>,
    dragged_folder_path: Option<&str>,
) -> Result<(Option<f64>, Option<f64>), PlanError> {
    let dest_children: Vec<&Node> = if dest.is_empty() {
        forest.iter().collect()
    } else {
        let runs = tree::folders_by_id(forest, &FolderId::new(dest));
        if runs.is_empty() {
            return Err(PlanError::unknown_target(target_path));
        }
        runs.iter().flat_map(|f| f.children.iter()).collect()
    };

    let Some(ti) = dest_children.iter().position(|n| n.path() == target_path) else {
        return Err(PlanError::unknown_target(target_path));
    };

    let block_bounds = |node: &Node| -> (f64, f64) {
        match node {
            Node::Page(p) => (p.record.ordering_key, p.record.ordering_key),
            Node::Folder(f) => {
                let run = tree::leaves(&f.children);
                match (run.first(), run.last()) {
                    (Some(first), Some(last)) => {
                        (first.record.ordering_key, last.record.ordering_key)
                    }
                    _ => (f.ordering_key, f.ordering_key),
                }
            }
        }
    };
    let is_dragged = |node: &Node| -> bool {
        match node {
            Node::Page(p) => dragged_ids.contains(p.record.id.as_str()),
            Node::Folder(f) => {
                dragged_folder_path.is_some_and(|dp| path::contains(dp, f.path()))
            }
        }
    };

    Ok(if before_target {
        let after = Some(block_bounds(dest_children[ti]).0);
        let before = dest_children[..ti]
            .iter()
            .rev()
            .find(|n| !is_dragged(n))
            .map(|n| block_bounds(n).1);
        (before, after)
    } else {
        let before = Some(block_bounds(dest_children[ti]).1);
        let after = dest_children[ti + 1..]
            .iter()
            .find(|n| !is_dragged(n))
            .map(|n| block_bounds(n).0);
        (before, after)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build;

    fn rec(id: &str, path: &str, key: f64) -> PageRecord {
        PageRecord::new(id, path, key)
    }

    fn sample() -> Vec<PageRecord> {
        vec![
            rec("a", "docs/intro.md", 1.0),
            rec("b", "docs/api/ref.md", 2.0),
            rec("c", "home.md", 3.0),
        ]
    }

    fn plan_for(
        dragged: DragSource,
        target: DropSpot,
        records: &[PageRecord],
    ) -> Result<RelocationPlan, PlanError> {
        let forest = build(records);
        plan(&dragged, &target, records, &forest)
    }

    #[test]
    fn page_dropped_inside_folder_lands_at_its_end() {
        let records = sample();
        let out = plan_for(
            DragSource::Page("c".into()),
            DropSpot::inside("docs"),
            &records,
        )
        .unwrap();
        assert_eq!(out.patches.len(), 1);
        let patch = &out.patches[0];
        assert_eq!(patch.id, "c");
        assert_eq!(patch.new_path, "docs/home.md");
        // After docs' last descendant (2.0), before nothing follows.
        assert!(patch.new_ordering_key > 2.0 && patch.new_ordering_key < 3.0);
    }

    #[test]
    fn page_dropped_before_sibling_keys_below_it() {
        let records = sample();
        let out = plan_for(
            DragSource::Page("c".into()),
            DropSpot::before("docs/intro.md"),
            &records,
        )
        .unwrap();
        let patch = &out.patches[0];
        assert_eq!(patch.new_path, "docs/home.md");
        assert!(patch.new_ordering_key < 1.0);
    }

    #[test]
    fn page_dropped_after_folder_clears_its_whole_block() {
        let records = sample();
        let out = plan_for(
            DragSource::Page("c".into()),
            DropSpot::after("docs"),
            &records,
        )
        .unwrap();
        let patch = &out.patches[0];
        // Stays at root level; key lands after docs' last descendant (2.0),
        // not after the folder's own key (1.0).
        assert_eq!(patch.new_path, "home.md");
        assert!(patch.new_ordering_key > 2.0);
    }

    #[test]
    fn folder_drag_moves_whole_subtree() {
        let records = vec![
            rec("a", "docs/intro.md", 1.0),
            rec("b", "docs/api/ref.md", 2.0),
            rec("b2", "docs/api/guide.md", 2.5),
            rec("c", "home.md", 3.0),
        ];
        let out = plan_for(
            DragSource::Folder(FolderId::new("docs/api")),
            DropSpot::after("home.md"),
            &records,
        )
        .unwrap();
        assert_eq!(out.patches.len(), 2);
        assert_eq!(out.patches[0].id, "b");
        assert_eq!(out.patches[0].new_path, "api/ref.md");
        assert_eq!(out.patches[1].id, "b2");
        assert_eq!(out.patches[1].new_path, "api/guide.md");
        // Fan-out: distinct ascending keys after home.md's 3.0.
        assert!(out.patches[0].new_ordering_key > 3.0);
        assert!(out.patches[0].new_ordering_key < out.patches[1].new_ordering_key);
    }

    #[test]
    fn drop_after_split_folder_run_keys_into_the_local_gap() {
        // docs is split into two runs by home.md; dropping after the
        // first run must land between that run's last leaf (1.0) and
        // home.md (2.0), not after the second run's leaf at 3.0.
        let records = vec![
            rec("a", "docs/a.md", 1.0),
            rec("h", "home.md", 2.0),
            rec("b", "docs/b.md", 3.0),
            rec("x", "extra.md", 10.0),
        ];
        let out = plan_for(
            DragSource::Page("x".into()),
            DropSpot::after("docs"),
            &records,
        )
        .unwrap();
        let patch = &out.patches[0];
        assert_eq!(patch.new_path, "extra.md");
        assert!(
            patch.new_ordering_key > 1.0 && patch.new_ordering_key < 2.0,
            "key {} not between the run and its next sibling",
            patch.new_ordering_key
        );
    }

    #[test]
    fn drop_before_split_folder_run_stays_below_its_first_leaf() {
        let records = vec![
            rec("a", "docs/a.md", 1.0),
            rec("h", "home.md", 2.0),
            rec("b", "docs/b.md", 3.0),
            rec("x", "extra.md", 10.0),
        ];
        let out = plan_for(
            DragSource::Page("x".into()),
            DropSpot::before("docs"),
            &records,
        )
        .unwrap();
        let patch = &out.patches[0];
        assert!(
            patch.new_ordering_key < 1.0,
            "key {} did not land before the first run",
            patch.new_ordering_key
        );
    }

    #[test]
    fn folder_into_own_subtree_is_noop() {
        let records = sample();
        let out = plan_for(
            DragSource::Folder(FolderId::new("docs")),
            DropSpot::inside("docs/api"),
            &records,
        )
        .unwrap();
        assert!(out.is_noop());
    }

    #[test]
    fn folder_onto_itself_is_noop() {
        let records = sample();
        let out = plan_for(
            DragSource::Folder(FolderId::new("docs")),
            DropSpot::inside("docs"),
            &records,
        )
        .unwrap();
        assert!(out.is_noop());
    }

    #[test]
    fn unknown_dragged_page_is_structured_error() {
        let records = sample();
        let err = plan_for(
            DragSource::Page("ghost".into()),
            DropSpot::inside("docs"),
            &records,
        )
        .unwrap_err();
        assert_eq!(err.kind(), PlanErrorKind::UnknownDragSource);
        assert_eq!(err.detail(), "ghost");
    }

    #[test]
    fn dragged_page_with_malformed_path_is_unknown() {
        let mut records = sample();
        records.push(rec("bad", "docs//broken.md", 1.5));
        let err = plan_for(
            DragSource::Page("bad".into()),
            DropSpot::inside("docs"),
            &records,
        )
        .unwrap_err();
        assert_eq!(err.kind(), PlanErrorKind::UnknownDragSource);
        assert_eq!(err.detail(), "bad");
    }

    #[test]
    fn unknown_target_is_structured_error() {
        let records = sample();
        let err = plan_for(
            DragSource::Page("c".into()),
            DropSpot::before("nowhere/x.md"),
            &records,
        )
        .unwrap_err();
        assert_eq!(err.kind(), PlanErrorKind::UnknownTarget);
    }

    #[test]
    fn malformed_target_is_structured_error() {
        let records = sample();
        for target in [DropSpot::before(""), DropSpot::inside("a//b")] {
            let err = plan_for(DragSource::Page("c".into()), target, &records).unwrap_err();
            assert_eq!(err.kind(), PlanErrorKind::MalformedTarget);
        }
    }

    #[test]
    fn same_folder_reorder_ignores_the_dragged_record() {
        let records = vec![
            rec("a", "docs/a.md", 1.0),
            rec("b", "docs/b.md", 2.0),
            rec("c", "docs/c.md", 3.0),
        ];
        let out = plan_for(
            DragSource::Page("a".into()),
            DropSpot::after("docs/c.md"),
            &records,
        )
        .unwrap();
        let patch = &out.patches[0];
        assert_eq!(patch.new_path, "docs/a.md");
        assert!(patch.new_ordering_key > 3.0);
    }

    #[test]
    fn drop_inside_root_appends_globally() {
        let records = sample();
        let out = plan_for(
            DragSource::Page("a".into()),
            DropSpot::inside(""),
            &records,
        )
        .unwrap();
        let patch = &out.patches[0];
        assert_eq!(patch.new_path, "intro.md");
        assert!(patch.new_ordering_key > 3.0);
    }

    #[test]
    fn untouched_records_survive_apply_unchanged() {
        let records = sample();
        let out = plan_for(
            DragSource::Page("c".into()),
            DropSpot::inside("docs"),
            &records,
        )
        .unwrap();
        let updated = out.apply(&records);
        for (old, new) in records.iter().zip(&updated) {
            if old.id != "c" {
                assert_eq!(old, new);
            }
        }
        let moved = updated.iter().find(|r| r.id == "c").unwrap();
        assert_eq!(moved.path, "docs/home.md");
    }

    #[test]
    fn noop_plan_applies_to_identity() {
        let records = sample();
        let out = RelocationPlan::noop();
        assert!(out.is_noop());
        assert_eq!(out.apply(&records), records);
    }
}
