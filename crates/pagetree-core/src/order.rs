//! Ordering policy: the global comparator and fractional-key interpolation.
//!
//! Every view the engine produces — tree, flat list, relocation bounds —
//! derives from one total order over page records, defined by [`compare`].
//! New keys for relocated records come from [`interpolate`], which places
//! them strictly between two existing neighbors so that nothing else needs
//! renumbering (the "fractional indexing" pattern from collaborative list
//! editors).
//!
//! # Tie-break rule
//!
//! The comparator is: numeric `ordering_key` first (via `f64::total_cmp`),
//! then segment-by-segment lexicographic comparison of the path (a path
//! that is a strict prefix of another sorts first), then title. There is
//! deliberately no folders-before-files bias: a folder's display position
//! is derived from its first descendant's key, so any grouping bias here
//! would fight the global order.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Collided neighbors (`before == after`) | prior key exhaustion | All keys emitted equal to that value |
//! | Precision exhaustion | interval below f64 resolution | Duplicate keys emitted, warn logged |
//!
//! Neither is an error: callers observing duplicate keys run
//! [`renormalize`] and persist its patches.

use std::cmp::Ordering;

use crate::record::{PagePatch, PageRecord};

/// Fraction of the open interval reserved at each edge by [`interpolate`],
/// so repeated insertions at the same edge do not immediately collide with
/// the neighbor.
pub const INTERPOLATE_MARGIN: f64 = 0.1;

/// Distance below the first key (or above the last) used as the anchor
/// when inserting at an unbounded edge.
pub const EDGE_ANCHOR_STEP: f64 = 1.0;

/// Total-order comparator over page records.
///
/// See the module docs for the tie-break rule. Total over all inputs
/// (including NaN keys, via `total_cmp`), so sorting is deterministic for
/// any snapshot.
#[must_use]
pub fn compare(a: &PageRecord, b: &PageRecord) -> Ordering {
    a.ordering_key
        .total_cmp(&b.ordering_key)
        .then_with(|| a.path.split('/').cmp(b.path.split('/')))
        .then_with(|| a.title.cmp(&b.title))
}

/// Produce `count` ascending keys strictly between `before` and `after`.
///
/// - Both bounds finite: keys are evenly spaced inside the open interval,
///   leaving [`INTERPOLATE_MARGIN`] of the interval at each edge.
/// - `before` is `None` (insert at the very start): the interval is
///   `(after - EDGE_ANCHOR_STEP, after)`.
/// - `after` is `None` (insert at the very end): the interval is
///   `(before, before + EDGE_ANCHOR_STEP)`.
/// - Both `None` (empty destination): `1.0, 2.0, …`.
/// - `before >= after` (neighbors already collided): every key equals
///   `before`; callers re-normalize when they observe this.
#[must_use]
pub fn interpolate(before: Option<f64>, after: Option<f64>, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let (lo, hi) = match (before, after) {
        (None, None) => {
            return (1..=count).map(|i| i as f64 * EDGE_ANCHOR_STEP).collect();
        }
        (Some(b), Some(a)) => (b, a),
        (None, Some(a)) => (a - EDGE_ANCHOR_STEP, a),
        (Some(b), None) => (b, b + EDGE_ANCHOR_STEP),
    };

    if !(lo < hi) {
        // Degenerate gap: both neighbors sit on the same key (or worse).
        #[cfg(feature = "tracing")]
        tracing::warn!(message = "order.interpolate.degenerate", lo, hi, count);
        return vec![lo; count];
    }

    let span = hi - lo;
    let inner_lo = lo + span * INTERPOLATE_MARGIN;
    let step = span * (1.0 - 2.0 * INTERPOLATE_MARGIN) / (count as f64 + 1.0);
    let keys: Vec<f64> = (1..=count).map(|i| inner_lo + step * i as f64).collect();

    #[cfg(feature = "tracing")]
    if keys.windows(2).any(|w| w[0] >= w[1]) || keys.iter().any(|&k| k <= lo || k >= hi) {
        tracing::warn!(message = "order.interpolate.exhausted", lo, hi, count);
    }

    keys
}

/// Reassign whole-number keys (`1.0, 2.0, …`) in current global order.
///
/// The recovery pass for key exhaustion: run it when [`interpolate`] has
/// been observed emitting duplicates, persist the patches, re-fetch.
/// Emits a patch only for records whose key actually changes; paths are
/// never touched.
#[must_use]
pub fn renormalize(records: &[PageRecord]) -> Vec<PagePatch> {
    let mut sorted: Vec<&PageRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
        .iter()
        .enumerate()
        .filter_map(|(i, rec)| {
            let key = (i + 1) as f64;
            if rec.ordering_key == key {
                None
            } else {
                Some(PagePatch {
                    id: rec.id.clone(),
                    new_path: rec.path.clone(),
                    new_ordering_key: key,
                })
            }
        })
        .collect()
}
