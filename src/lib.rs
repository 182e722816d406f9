//! # QuillKV
//!
//! A minimal write-ahead logging core:
//! - Append-only WAL with checksummed, length-prefixed records
//! - Commit protocol that replays the buffered records into memory
//! - Atomic `key=value` snapshots after every commit
//! - Separate lock domains for the log and the store
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Callers                              │
//! │              append / commit / read (any thread)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        log lock: append + whole commit protocol              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐   replay  ┌─────────────┐
//!   │ Record Log  │ ────────▶ │    Store    │
//!   │ (wal.log)   │           │  (RwLock)   │
//!   └─────────────┘           └──────┬──────┘
//!                                    │ flush
//!                                    ▼
//!                            ┌───────────────┐
//!                            │   Snapshot    │
//!                            │(database_state)│
//!                            └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use quillkv::Engine;
//!
//! # fn main() -> quillkv::Result<()> {
//! let engine = Engine::open_path(std::path::Path::new("./quillkv_data"))?;
//! engine.begin("T1")?;
//! engine.set("balance", "1200")?;
//! engine.commit()?;
//! assert_eq!(engine.get("balance").as_deref(), Some("1200"));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod store;
pub mod snapshot;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{QuillError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of QuillKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
