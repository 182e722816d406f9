//! WAL record definitions
//!
//! Defines the structure of individual log records and their on-disk frame.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::config::OperationPolicy;
use crate::error::{QuillError, Result};

use super::checksum::{compute_checksum, verify_checksum};

/// Reserved label opening a transaction (marker, no store effect)
pub const BEGIN_TRANSACTION: &str = "BEGIN TRANSACTION";

/// Reserved label sealing a transaction (marker, no store effect)
pub const COMMIT_TRANSACTION: &str = "COMMIT TRANSACTION";

/// Label for an explicit set; payload is `key=value`
pub const SET: &str = "SET";

/// Label for an explicit delete; payload is the key
pub const DELETE: &str = "DELETE";

/// Frame header size: LSN (8) + CRC (4) + Len (4) = 16 bytes
pub const HEADER_SIZE: usize = 16;

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Transaction start marker
    Begin { label: String },

    /// Transaction commit marker
    Commit,

    /// Set a key to a value
    Set { key: String, value: String },

    /// A caller-defined mutation directive; applied like `Set`, with the
    /// caller's label kept verbatim in the log
    Update {
        directive: String,
        key: String,
        value: String,
    },

    /// Remove a key
    Delete { key: String },
}

impl Operation {
    /// Map a text `(label, payload)` pair onto a typed operation.
    ///
    /// Reserved labels map to their variants. Anything else is a generic
    /// mutation directive targeting `default_key` under
    /// [`OperationPolicy::Permissive`], or a validation error under
    /// [`OperationPolicy::Strict`]. The payload of a commit marker is ignored.
    pub fn parse(
        label: &str,
        payload: &str,
        policy: OperationPolicy,
        default_key: &str,
    ) -> Result<Self> {
        let operation = match label {
            BEGIN_TRANSACTION => Operation::Begin {
                label: payload.to_string(),
            },
            COMMIT_TRANSACTION => Operation::Commit,
            SET => {
                let (key, value) = payload.split_once('=').ok_or_else(|| {
                    QuillError::Validation(format!(
                        "SET payload must be key=value, got {:?}",
                        payload
                    ))
                })?;
                Operation::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            DELETE => Operation::Delete {
                key: payload.to_string(),
            },
            other => match policy {
                OperationPolicy::Permissive => {
                    tracing::trace!("Treating {:?} as a mutation of {:?}", other, default_key);
                    Operation::Update {
                        directive: other.to_string(),
                        key: default_key.to_string(),
                        value: payload.to_string(),
                    }
                }
                OperationPolicy::Strict => {
                    return Err(QuillError::Validation(format!(
                        "unknown operation {:?}",
                        other
                    )));
                }
            },
        };

        operation.validate()?;
        Ok(operation)
    }

    /// Check that keys and values fit the line-oriented snapshot format
    pub fn validate(&self) -> Result<()> {
        match self {
            Operation::Begin { .. } | Operation::Commit => Ok(()),
            Operation::Set { key, value } | Operation::Update { key, value, .. } => {
                validate_key(key)?;
                if value.contains(['\n', '\r']) {
                    return Err(QuillError::Validation(format!(
                        "value for {:?} contains a line break",
                        key
                    )));
                }
                Ok(())
            }
            Operation::Delete { key } => validate_key(key),
        }
    }

    /// The text label of this operation
    pub fn label(&self) -> &str {
        match self {
            Operation::Begin { .. } => BEGIN_TRANSACTION,
            Operation::Commit => COMMIT_TRANSACTION,
            Operation::Set { .. } => SET,
            Operation::Update { directive, .. } => directive,
            Operation::Delete { .. } => DELETE,
        }
    }

    /// The text payload of this operation, in the form `parse` accepts
    pub fn payload(&self) -> String {
        match self {
            Operation::Begin { label } => label.clone(),
            Operation::Commit => String::new(),
            Operation::Set { key, value } => format!("{}={}", key, value),
            Operation::Update { value, .. } => value.clone(),
            Operation::Delete { key } => key.clone(),
        }
    }

    /// Markers delimit transactions and never touch the store
    pub fn is_marker(&self) -> bool {
        matches!(self, Operation::Begin { .. } | Operation::Commit)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Commit => f.write_str(COMMIT_TRANSACTION),
            Operation::Update {
                directive,
                key,
                value,
            } => write!(f, "{} [{}={}]", directive, key, value),
            other => write!(f, "{} {}", other.label(), other.payload()),
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(QuillError::Validation("key must not be empty".to_string()));
    }
    if key.contains('=') || key.contains(['\n', '\r']) {
        return Err(QuillError::Validation(format!(
            "key {:?} must not contain '=' or line breaks",
            key
        )));
    }
    Ok(())
}

/// A single record in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// CRC32 over the LSN and the encoded operation
    pub checksum: u32,
}

impl LogRecord {
    /// Build a record, computing its checksum
    pub fn new(lsn: u64, operation: Operation) -> Result<Self> {
        let data = bincode::serialize(&operation)?;
        let checksum = compute_checksum(lsn, &data);
        Ok(Self {
            lsn,
            operation,
            checksum,
        })
    }

    /// Recompute the checksum from the logical fields
    pub fn compute_crc(&self) -> Result<u32> {
        let data = bincode::serialize(&self.operation)?;
        Ok(compute_checksum(self.lsn, &data))
    }

    /// Fail with `WalCorruption` if the stored checksum is stale
    pub fn verify(&self) -> Result<()> {
        let data = bincode::serialize(&self.operation)?;
        if verify_checksum(self.lsn, &data, self.checksum) {
            Ok(())
        } else {
            Err(QuillError::corruption(self.lsn, "checksum mismatch"))
        }
    }

    /// Encode the record as a frame:
    /// `[LSN u64 LE][CRC u32 LE][LEN u32 LE][bincode(operation)]`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(&self.operation)?;
        let len = u32::try_from(data.len()).map_err(|_| {
            QuillError::WalWrite(format!("record {} exceeds the frame size limit", self.lsn))
        })?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + data.len());
        buf.put_u64_le(self.lsn);
        buf.put_u32_le(self.checksum);
        buf.put_u32_le(len);
        buf.put_slice(&data);
        Ok(buf.to_vec())
    }

    /// Size of the encoded frame in bytes
    pub fn serialized_size(&self) -> Result<usize> {
        let data_len = bincode::serialized_size(&self.operation)?;
        Ok(HEADER_SIZE + data_len as usize)
    }

    /// Decode one frame from the start of `bytes`, verifying its checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(QuillError::corruption(0, "truncated record header"));
        }

        let (header, rest) = bytes.split_at(HEADER_SIZE);
        let FrameHeader { lsn, checksum, len } = FrameHeader::decode(header);
        let data = rest
            .get(..len)
            .ok_or_else(|| QuillError::corruption(lsn, "truncated record body"))?;

        Self::from_parts(lsn, checksum, data)
    }

    /// Verify `data` against the header fields and decode the operation
    pub(crate) fn from_parts(lsn: u64, checksum: u32, data: &[u8]) -> Result<Self> {
        if !verify_checksum(lsn, data, checksum) {
            return Err(QuillError::corruption(lsn, "checksum mismatch"));
        }

        let operation: Operation = bincode::deserialize(data)
            .map_err(|e| QuillError::corruption(lsn, format!("undecodable operation: {}", e)))?;

        Ok(Self {
            lsn,
            operation,
            checksum,
        })
    }
}

/// Decoded fixed-size frame header
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameHeader {
    pub lsn: u64,
    pub checksum: u32,
    pub len: usize,
}

impl FrameHeader {
    /// Decode a header; `bytes` must hold at least `HEADER_SIZE` bytes
    pub(crate) fn decode(mut bytes: &[u8]) -> Self {
        let lsn = bytes.get_u64_le();
        let checksum = bytes.get_u32_le();
        let len = bytes.get_u32_le() as usize;
        Self { lsn, checksum, len }
    }
}
