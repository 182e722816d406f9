//! Snapshot Module
//!
//! Full, point-in-time serialization of the store to a text file.
//!
//! ## File Format
//! ```text
//! balance=1299
//! owner=alice
//! ```
//! One `key=value` line per key in ascending key order. The file is
//! rewritten in full on every flush through a temp file and a rename, so a
//! failed flush leaves the previous snapshot intact.

mod writer;

pub use writer::{load, SnapshotWriter};
