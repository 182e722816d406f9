//! WAL Reader
//!
//! The verify-on-read path: decodes frames from a WAL file and checks every
//! checksum. A mismatch is surfaced as `QuillError::WalCorruption`, never
//! skipped silently. Reading does not rebuild any store state.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::error::{QuillError, Result};

use super::record::{FrameHeader, HEADER_SIZE};
use super::LogRecord;

/// Reads records from a WAL file
pub struct WalReader {
    path: PathBuf,
    reader: BufReader<File>,
    /// Byte offset of the next frame
    position: u64,
    file_len: u64,
}

/// Outcome of scanning a whole WAL file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Frames whose checksum verified
    pub records_valid: u64,

    /// Complete frames that failed verification
    pub records_corrupted: u64,

    /// LSN of the last valid frame (0 if none)
    pub last_lsn: u64,

    /// Bytes covered by complete frames
    pub valid_bytes: u64,

    /// Whether the file ends in an incomplete frame
    pub torn_tail: bool,
}

impl VerifyReport {
    /// True if every byte of the file belongs to a verified frame
    pub fn is_clean(&self) -> bool {
        self.records_corrupted == 0 && !self.torn_tail
    }
}

/// Result of pulling one frame off the file
enum Frame {
    Record(LogRecord),
    Corrupt(QuillError),
    Torn,
    End,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next record from the WAL
    ///
    /// Returns `Ok(None)` at a clean end of file, and `WalCorruption` for a
    /// checksum mismatch or an incomplete trailing frame.
    pub fn next_record(&mut self) -> Result<Option<LogRecord>> {
        match self.next_frame()? {
            Frame::Record(record) => Ok(Some(record)),
            Frame::Corrupt(err) => Err(err),
            Frame::Torn => Err(QuillError::corruption(
                0,
                format!("incomplete frame at offset {}", self.position),
            )),
            Frame::End => Ok(None),
        }
    }

    /// Iterate over all records, stopping after the first error
    pub fn records(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Byte offset of the next frame
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Scan a WAL file and report its integrity without modifying it
    ///
    /// Corrupted frames are counted and skipped using their length prefix;
    /// scanning stops at an incomplete trailing frame.
    pub fn verify(path: &Path) -> Result<VerifyReport> {
        let mut reader = Self::open(path)?;
        let mut report = VerifyReport::default();

        loop {
            match reader.next_frame()? {
                Frame::Record(record) => {
                    report.records_valid += 1;
                    report.last_lsn = record.lsn;
                }
                Frame::Corrupt(err) => {
                    tracing::warn!("{}: {}", reader.path.display(), err);
                    report.records_corrupted += 1;
                }
                Frame::Torn => {
                    report.torn_tail = true;
                    break;
                }
                Frame::End => break,
            }
            report.valid_bytes = reader.position;
        }

        Ok(report)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn next_frame(&mut self) -> Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        match self.read_full(&mut header)? {
            0 => return Ok(Frame::End),
            n if n < HEADER_SIZE => return Ok(Frame::Torn),
            _ => {}
        }

        let FrameHeader { lsn, checksum, len } = FrameHeader::decode(&header);
        let remaining = self.file_len.saturating_sub(self.position + HEADER_SIZE as u64);
        if len as u64 > remaining {
            return Ok(Frame::Torn);
        }

        let mut data = vec![0u8; len];
        if self.read_full(&mut data)? < len {
            return Ok(Frame::Torn);
        }

        self.position += (HEADER_SIZE + len) as u64;

        match LogRecord::from_parts(lsn, checksum, &data) {
            Ok(record) => Ok(Frame::Record(record)),
            Err(err) if err.is_corruption() => Ok(Frame::Corrupt(err)),
            Err(err) => Err(err),
        }
    }

    /// Fill `buf` as far as the file allows; returns the bytes read
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

/// Iterator over WAL records
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
