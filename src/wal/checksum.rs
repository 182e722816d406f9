//! Record checksums
//!
//! CRC32 (IEEE) over a record's logical fields: the LSN as little-endian
//! bytes followed by the encoded operation. The same function backs the
//! write path and the verify-on-read path.

use crc32fast::Hasher;

/// Compute the checksum for a record with the given LSN and encoded operation
pub fn compute_checksum(lsn: u64, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&lsn.to_le_bytes());
    hasher.update(data);
    hasher.finalize()
}

/// Check a stored checksum against the recomputed one
pub fn verify_checksum(lsn: u64, data: &[u8], expected: u32) -> bool {
    compute_checksum(lsn, data) == expected
}
