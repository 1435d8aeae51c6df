//! Page records and relocation patches.
//!
//! [`PageRecord`] is the engine's sole input type: an immutable snapshot
//! row fetched from the wiki API. [`PagePatch`] is the engine's sole write
//! output: the minimal `{id, new_path, new_ordering_key}` triple a caller
//! persists after a relocation or renormalization.
//!
//! Records cross a JSON boundary, so both types carry serde derives behind
//! the `serde` feature (camelCase field names to match the wire format).

/// One wiki page, as fetched from the data-access layer.
///
/// The engine reads `path` and `ordering_key`; `title` is opaque payload
/// used only as the final comparator tie-break. `id` is the stable page
/// identity — paths are *not* identity and may collide.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PageRecord {
    /// Opaque stable identifier, unique per logical page.
    pub id: String,
    /// '/'-delimited path; the last segment is the page's own name.
    pub path: String,
    /// Position among siblings and globally. Fractional on purpose: new
    /// keys are interpolated between neighbors, never renumbered.
    pub ordering_key: f64,
    /// Display title. Comparator fallback of last resort.
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
}

impl PageRecord {
    /// Create a record with an empty title.
    #[must_use]
    pub fn new(id: impl Into<String>, path: impl Into<String>, ordering_key: f64) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            ordering_key,
            title: String::new(),
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// A single persisted change produced by the relocation planner or the
/// renormalization pass.
///
/// The caller applies each patch through its update API and then re-fetches
/// the snapshot; the engine never mutates records in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PagePatch {
    /// Identity of the record to update.
    pub id: String,
    /// Replacement path (full, '/'-delimited).
    pub new_path: String,
    /// Replacement ordering key.
    pub new_ordering_key: f64,
}

impl PagePatch {
    /// Apply this patch to a matching record, returning whether it matched.
    pub fn apply_to(&self, record: &mut PageRecord) -> bool {
        if record.id != self.id {
            return false;
        }
        record.path = self.new_path.clone();
        record.ordering_key = self.new_ordering_key;
        true
    }
}
