//! Error types for QuillKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using QuillError
pub type Result<T> = std::result::Result<T, QuillError>;

/// Unified error type for QuillKV operations
#[derive(Debug, Error)]
pub enum QuillError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    /// A record failed checksum verification or could not be decoded.
    /// The record must not be applied.
    #[error("WAL corruption detected at lsn {lsn}: {reason}")]
    WalCorruption { lsn: u64, reason: String },

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid operation: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuillError {
    /// Build a corruption error for the record at `lsn`
    pub(crate) fn corruption(lsn: u64, reason: impl Into<String>) -> Self {
        QuillError::WalCorruption {
            lsn,
            reason: reason.into(),
        }
    }

    /// True when the error signals a data-integrity failure
    pub fn is_corruption(&self) -> bool {
        matches!(self, QuillError::WalCorruption { .. })
    }
}

impl From<bincode::Error> for QuillError {
    fn from(err: bincode::Error) -> Self {
        QuillError::Serialization(err.to_string())
    }
}
