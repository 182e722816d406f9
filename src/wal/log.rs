//! Record Log
//!
//! The ordered in-memory buffer of uncommitted records, mirrored to the WAL
//! file. Owns LSN assignment.

use std::path::Path;

use crate::config::WalSyncStrategy;
use crate::error::Result;

use super::{LogRecord, Operation, WalWriter};

/// Append-only buffer of records plus the writer that persists them
///
/// Not synchronized on its own; the engine keeps it behind the log lock.
pub struct RecordLog {
    writer: WalWriter,
    records: Vec<LogRecord>,
    /// Last assigned LSN (0 before the first append)
    current_lsn: u64,
}

impl RecordLog {
    /// Open the WAL file at `path`; LSNs start at 1 for this run
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        Ok(Self {
            writer: WalWriter::open(path, sync_strategy)?,
            records: Vec::new(),
            current_lsn: 0,
        })
    }

    /// Append an operation and return its LSN
    ///
    /// The frame is written to disk before the record joins the buffer. If
    /// the write fails, neither the buffer nor the LSN counter changes.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.current_lsn + 1;
        let record = LogRecord::new(lsn, operation)?;

        if record.operation.is_marker() {
            self.writer.append_durable(&record)?;
        } else {
            self.writer.append(&record)?;
        }

        self.records.push(record);
        self.current_lsn = lsn;
        Ok(lsn)
    }

    /// Buffered records in ascending LSN order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    #[cfg(test)]
    pub(crate) fn records_mut(&mut self) -> &mut Vec<LogRecord> {
        &mut self.records
    }

    /// Drop all buffered records (after a successful commit)
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of buffered records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Last assigned LSN
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Force the WAL file to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.sync()
    }

    pub fn writer(&self) -> &WalWriter {
        &self.writer
    }
}
