//! Store Module
//!
//! The in-memory key-value state, mutated only by replaying committed
//! log records.
//!
//! ## Responsibilities
//! - Apply one record at a time (the State Applier)
//! - Hand out isolated, point-in-time copies (the Store Reader)
//! - Count applied records, markers included
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in RwLock:
//! - Ordered keys give a deterministic snapshot layout
//! - Readers never block each other, applies are exclusive per call

mod table;

pub use table::Store;
