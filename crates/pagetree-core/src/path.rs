//! Slash-delimited path model.
//!
//! A page path like `docs/api/ref.md` is an ordered list of segments: the
//! final segment (`ref.md`) names the page itself, every preceding segment
//! names an ancestor folder. Folders have no records of their own — they
//! exist only as shared prefixes.
//!
//! Parsing is the validation boundary: a [`PagePath`] is guaranteed
//! non-empty with no empty segments, so downstream code never re-checks.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `PathErrorKind::Empty` | `""` | Record skipped by builders, logged |
//! | `PathErrorKind::EmptySegment` | leading/trailing/double slash | Record skipped by builders, logged |

use std::fmt;

/// Error classification for malformed paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorKind {
    /// The path string was empty.
    Empty,
    /// A segment between slashes was empty (`/a`, `a/`, `a//b`).
    EmptySegment,
}

/// A malformed page path, carrying the offending string for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    kind: PathErrorKind,
    path: String,
}

impl PathError {
    /// Error classification.
    #[must_use]
    pub fn kind(&self) -> PathErrorKind {
        self.kind
    }

    /// The path string that failed to parse.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PathErrorKind::Empty => write!(f, "empty page path"),
            PathErrorKind::EmptySegment => {
                write!(f, "empty segment in page path {:?}", self.path)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A validated, parsed page path.
///
/// Owns its segments; cheap to clone relative to the per-snapshot work the
/// builders do anyway. Ordering-sensitive comparisons go through
/// [`crate::order::compare`], not through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    segments: Vec<String>,
}

impl PagePath {
    /// Parse and validate a slash-delimited path.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError {
                kind: PathErrorKind::Empty,
                path: path.to_owned(),
            });
        }
        let segments: Vec<String> = path.split('/').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError {
                kind: PathErrorKind::EmptySegment,
                path: path.to_owned(),
            });
        }
        Ok(Self { segments })
    }

    /// All segments in order, ancestors first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment: the page's own name.
    #[must_use]
    pub fn leaf_name(&self) -> &str {
        // Invariant from parse(): at least one non-empty segment.
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The ancestor folder segments (everything before the leaf).
    #[must_use]
    pub fn ancestors(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Number of ancestor segments; the leaf's indentation depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// The parent folder path, or `None` at root level.
    #[must_use]
    pub fn parent(&self) -> Option<String> {
        if self.segments.len() < 2 {
            None
        } else {
            Some(self.ancestors().join("/"))
        }
    }

    /// Joined string form of the first `len` segments.
    #[must_use]
    pub fn prefix(&self, len: usize) -> String {
        self.segments[..len.min(self.segments.len())].join("/")
    }

    /// Full joined string form.
    #[must_use]
    pub fn join(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// The parent folder of a raw path string, or `None` at root level.
///
/// String-level counterpart of [`PagePath::parent`] for call sites that
/// hold an unparsed target path.
#[must_use]
pub fn parent_of(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// Whether `folder` contains `other`: equal, or a segment-boundary prefix.
///
/// `"docs"` contains `"docs"` and `"docs/api/ref.md"`, but not
/// `"docs2/x.md"`. Used by the relocation cycle guard.
#[must_use]
pub fn contains(folder: &str, other: &str) -> bool {
    other == folder
        || (other.len() > folder.len()
            && other.starts_with(folder)
            && other.as_bytes()[folder.len()] == b'/')
}
