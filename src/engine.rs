//! Engine Module
//!
//! The WAL engine that coordinates the record log, the store and the
//! snapshot writer.
//!
//! ## Responsibilities
//! - Assign LSNs and persist records before they take effect
//! - Run the commit protocol (marker → replay → snapshot → clear)
//! - Hand out isolated copies of the store

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::snapshot::SnapshotWriter;
use crate::store::Store;
use crate::wal::{LogRecord, Operation, RecordLog};

/// The write-ahead log engine
///
/// ## Concurrency Model: two lock domains
///
/// - **Log domain** (`log` mutex): LSN assignment, durable append and the
///   whole commit protocol. Commits are serialized with each other and with
///   appends.
/// - **Store domain** (RwLock inside `Store`): one apply or one read at a
///   time. A reader running during a commit may see the store between two
///   applies.
///
/// Lock order is always log → store.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the WAL file
    wal_path: PathBuf,

    /// Buffered records and the WAL writer
    log: Mutex<RecordLog>,

    /// Replayed key-value state (internal RwLock)
    store: Store,

    /// Writes the key=value snapshot after each commit
    snapshot: SnapshotWriter,

    /// Durability watermark: LSN through which the snapshot is current
    committed_lsn: AtomicU64,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const SNAPSHOT_FILENAME: &'static str = "database_state";

    /// Open or create an engine with the given config
    ///
    /// Creates the data directory and opens `wal.log` for appending. An
    /// existing log is appended to; it is not replayed into the store.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        let snapshot_path = config.data_dir.join(Self::SNAPSHOT_FILENAME);

        let log = RecordLog::open(&wal_path, config.wal_sync_strategy)?;
        if !log.writer().is_empty() {
            tracing::debug!(
                "Appending to existing WAL {} ({} bytes); LSNs restart at 1",
                wal_path.display(),
                log.writer().len()
            );
        }

        Ok(Self {
            config,
            wal_path,
            log: Mutex::new(log),
            store: Store::new(),
            snapshot: SnapshotWriter::new(snapshot_path),
            committed_lsn: AtomicU64::new(0),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Append a text `(operation, payload)` record and return its LSN
    ///
    /// `BEGIN TRANSACTION`, `COMMIT TRANSACTION`, `SET` (payload
    /// `key=value`) and `DELETE` (payload `key`) are reserved. Other labels
    /// follow the configured [`OperationPolicy`](crate::config::OperationPolicy).
    /// Appending a commit marker here only logs it; use [`commit`](Self::commit)
    /// to apply the buffer.
    pub fn append(&self, operation: &str, payload: &str) -> Result<u64> {
        let operation = Operation::parse(
            operation,
            payload,
            self.config.operation_policy,
            &self.config.default_key,
        )?;
        self.append_operation(operation)
    }

    /// Append a typed operation and return its LSN
    ///
    /// Invalid operations are rejected before an LSN is assigned.
    pub fn append_operation(&self, operation: Operation) -> Result<u64> {
        operation.validate()?;

        let mut log = self.log.lock();
        let lsn = log.append(operation)?;
        Ok(lsn)
    }

    /// Append a transaction start marker
    pub fn begin(&self, label: impl Into<String>) -> Result<u64> {
        self.append_operation(Operation::Begin {
            label: label.into(),
        })
    }

    /// Append a set of `key` to `value`
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<u64> {
        self.append_operation(Operation::Set {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Append a removal of `key`
    pub fn delete(&self, key: impl Into<String>) -> Result<u64> {
        self.append_operation(Operation::Delete { key: key.into() })
    }

    /// Commit the buffered records and return the commit marker's LSN
    ///
    /// Steps, all under the log lock:
    /// 1. Append and fsync a `COMMIT TRANSACTION` marker
    /// 2. Verify and apply every buffered record in LSN order
    /// 3. Snapshot the store, then advance the committed LSN
    /// 4. Clear the buffer
    ///
    /// Records produced by `append` always carry a valid checksum; the
    /// replay check catches a buffered record altered after the fact.
    ///
    /// If a step fails its error is returned and nothing is undone. The
    /// whole buffer is replayed, so records left behind by a failed commit
    /// are applied again by the next one.
    pub fn commit(&self) -> Result<u64> {
        let mut log = self.log.lock();

        // Step 1: Seal the batch
        let commit_lsn = log.append(Operation::Commit)?;

        // Step 2: Replay; a corrupted record is never applied
        for record in log.records() {
            record.verify()?;
            self.store.apply(record)?;
        }

        // Step 3: Snapshot, then move the watermark
        self.snapshot.write(&self.store.read())?;
        self.committed_lsn.store(log.current_lsn(), Ordering::SeqCst);

        // Step 4: Clear the buffer
        let replayed = log.len();
        log.clear();

        tracing::debug!(
            "Committed lsn {} ({} records replayed, version {})",
            commit_lsn,
            replayed,
            self.store.version()
        );

        Ok(commit_lsn)
    }

    /// Copy of the current store contents
    pub fn read(&self) -> BTreeMap<String, String> {
        self.store.read()
    }

    /// Get one value from the store
    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Force the WAL to disk
    pub fn sync(&self) -> Result<()> {
        self.log.lock().sync()
    }

    /// Close the engine, syncing the WAL
    ///
    /// Uncommitted records stay in the log file but are not applied.
    pub fn close(self) -> Result<()> {
        let mut log = self.log.into_inner();
        if !log.is_empty() {
            tracing::warn!("Closing with {} uncommitted records", log.len());
        }
        log.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Last assigned LSN
    pub fn current_lsn(&self) -> u64 {
        self.log.lock().current_lsn()
    }

    /// LSN through which the latest snapshot is current
    pub fn committed_lsn(&self) -> u64 {
        self.committed_lsn.load(Ordering::SeqCst)
    }

    /// Number of buffered, uncommitted records
    pub fn pending_count(&self) -> usize {
        self.log.lock().len()
    }

    /// Copy of the buffered, uncommitted records
    pub fn pending_records(&self) -> Vec<LogRecord> {
        self.log.lock().records().to_vec()
    }

    /// Total apply calls so far, markers included
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL file path
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// Get the snapshot file path
    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
