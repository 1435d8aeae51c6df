#![forbid(unsafe_code)]

//! Core data model for the pagetree engine.
//!
//! A wiki stores pages as a flat collection of records, each carrying a
//! slash-delimited path and a numeric ordering key. This crate defines
//! those records ([`record`]), the path model ([`path`]), and the ordering
//! policy ([`order`]) that gives the collection a single deterministic
//! total order. The tree/flatten/relocation machinery that consumes these
//! types lives in `pagetree-nav`.
//!
//! Everything here is pure and synchronous: no I/O, no shared state, no
//! interior mutability. Callers own a snapshot of records per invocation.

pub mod order;
pub mod path;
pub mod record;

pub use order::{compare, interpolate, renormalize};
pub use path::{PagePath, PathError, PathErrorKind};
pub use record::{PagePatch, PageRecord};
