//! WAL Writer
//!
//! Handles appending record frames to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::{QuillError, Result};

use super::LogRecord;

/// Writes record frames to the WAL file
///
/// The writer only deals in bytes; LSN assignment lives in
/// [`RecordLog`](super::RecordLog).
pub struct WalWriter {
    /// Path to the WAL file
    path: PathBuf,

    /// Append-only file handle
    file: File,

    /// When to fsync
    sync_strategy: WalSyncStrategy,

    /// Frames written since the last fsync
    unsynced_count: usize,

    /// File length after the last successful append
    len: u64,
}

impl WalWriter {
    /// Open or create a WAL file for append-only writing
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();

        tracing::debug!("Opened WAL {} ({} bytes)", path.display(), len);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sync_strategy,
            unsynced_count: 0,
            len,
        })
    }

    /// Append a record, syncing according to the configured strategy
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.write_frame(record, false)
    }

    /// Append a record and fsync regardless of strategy (commit markers)
    pub fn append_durable(&mut self, record: &LogRecord) -> Result<()> {
        self.write_frame(record, true)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced_count = 0;
        Ok(())
    }

    /// Number of frames written since the last fsync
    pub fn unsynced_count(&self) -> usize {
        self.unsynced_count
    }

    /// Current file length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True if nothing has ever been written to the file
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the WAL file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_frame(&mut self, record: &LogRecord, force_sync: bool) -> Result<()> {
        let frame = record.serialize()?;
        let unsynced_before = self.unsynced_count;

        if let Err(e) = self.try_write(&frame, force_sync) {
            self.unsynced_count = unsynced_before;
            self.rollback(record.lsn);
            return Err(QuillError::WalWrite(format!("lsn {}: {}", record.lsn, e)));
        }

        self.len += frame.len() as u64;
        tracing::trace!("Wrote lsn {} ({} bytes)", record.lsn, frame.len());
        Ok(())
    }

    fn try_write(&mut self, frame: &[u8], force_sync: bool) -> std::io::Result<()> {
        self.file.write_all(frame)?;
        self.unsynced_count += 1;

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced_count >= count,
        };

        if force_sync || due {
            self.file.sync_data()?;
            self.unsynced_count = 0;
        }
        Ok(())
    }

    /// Cut any torn bytes of a failed frame off the end of the file
    fn rollback(&mut self, lsn: u64) {
        if let Err(e) = self.file.set_len(self.len) {
            tracing::warn!(
                "Failed to truncate torn frame for lsn {} in {}: {}",
                lsn,
                self.path.display(),
                e
            );
        }
    }
}
