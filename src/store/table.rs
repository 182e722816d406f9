//! Store implementation
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;
use crate::wal::{LogRecord, Operation};

/// In-memory key-value store
///
/// ## Concurrency:
/// - `data`: RwLock held for a single apply or a single read, never across
///   a replay loop
/// - `version`: atomic counter of apply calls
pub struct Store {
    data: RwLock<BTreeMap<String, String>>,
    version: AtomicU64,
}

impl Store {
    /// Create a new empty Store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Apply one record's operation (write lock)
    ///
    /// Markers leave the data untouched but still bump the version.
    pub fn apply(&self, record: &LogRecord) -> Result<()> {
        {
            let mut data = self.data.write();
            match &record.operation {
                Operation::Begin { .. } | Operation::Commit => {}
                Operation::Set { key, value } | Operation::Update { key, value, .. } => {
                    data.insert(key.clone(), value.clone());
                }
                Operation::Delete { key } => {
                    data.remove(key);
                }
            }
        }

        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!("Applied lsn {} ({}), version {}", record.lsn, record.operation, version);
        Ok(())
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.read().get(key).cloned()
    }

    /// Copy the whole store (read lock)
    ///
    /// The copy is owned by the caller; changes on either side are invisible
    /// to the other.
    pub fn read(&self) -> BTreeMap<String, String> {
        self.data.read().clone()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Total apply calls so far, markers included
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
