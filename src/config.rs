//! Configuration for QuillKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{QuillError, Result};

/// Main configuration for a QuillKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log          (write-ahead log)
    ///     └── database_state   (key=value snapshot)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // Operation Handling
    // -------------------------------------------------------------------------
    /// How the text API treats operation labels it does not recognize
    pub operation_policy: OperationPolicy,

    /// Key targeted by generic mutation directives under the permissive policy
    pub default_key: String,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced entries (balanced durability/performance).
    /// Commit markers always sync.
    EveryNEntries { count: usize },
}

/// Policy for operation labels outside the reserved set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPolicy {
    /// Unknown labels are generic mutations setting `default_key` to the payload;
    /// the label itself is kept in the logged record
    Permissive,

    /// Unknown labels are rejected with `QuillError::Validation`
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./quillkv_data"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            operation_policy: OperationPolicy::Permissive,
            default_key: "balance".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(QuillError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }

        if self.default_key.is_empty()
            || self.default_key.contains('=')
            || self.default_key.contains(['\n', '\r'])
        {
            return Err(QuillError::Config(format!(
                "default key {:?} is not a valid snapshot key",
                self.default_key
            )));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the policy for unrecognized operation labels
    pub fn operation_policy(mut self, policy: OperationPolicy) -> Self {
        self.config.operation_policy = policy;
        self
    }

    /// Set the key targeted by generic mutation directives
    pub fn default_key(mut self, key: impl Into<String>) -> Self {
        self.config.default_key = key.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
