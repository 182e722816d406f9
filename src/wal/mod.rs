//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append log records before any mutation takes effect
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Verify-on-read scanning of an existing log
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. `Data` is the bincode-encoded
//! [`Operation`]; CRC covers the LSN bytes followed by `Data`. Each run
//! restarts LSNs at 1 and appends to the existing file.

pub mod checksum;
mod log;
mod reader;
mod record;
mod writer;

pub use log::RecordLog;
pub use reader::{VerifyReport, WalIterator, WalReader};
pub use record::{
    LogRecord, Operation, BEGIN_TRANSACTION, COMMIT_TRANSACTION, DELETE, HEADER_SIZE, SET,
};
pub use writer::WalWriter;
