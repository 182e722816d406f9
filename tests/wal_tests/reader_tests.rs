//! Tests for WAL Reader
//!
//! These tests verify:
//! - Reading back a clean log
//! - Checksum mismatches surface as corruption, never as records
//! - Torn tails are detected and reported
//! - `verify` counts without modifying the file

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use quillkv::wal::{LogRecord, Operation, WalReader, HEADER_SIZE};
use quillkv::QuillError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn records(count: u64) -> Vec<LogRecord> {
    (1..=count)
        .map(|lsn| {
            LogRecord::new(
                lsn,
                Operation::Set {
                    key: format!("key{}", lsn),
                    value: format!("value{}", lsn),
                },
            )
            .unwrap()
        })
        .collect()
}

/// Write serialized records directly to a file (for crafting corruption)
fn write_raw(path: &PathBuf, records: &[LogRecord]) -> Vec<usize> {
    let mut file = File::create(path).unwrap();
    let mut sizes = Vec::new();
    for record in records {
        let bytes = record.serialize().unwrap();
        sizes.push(bytes.len());
        file.write_all(&bytes).unwrap();
    }
    file.sync_all().unwrap();
    sizes
}

// =============================================================================
// Clean Log Tests
// =============================================================================

#[test]
fn test_read_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn test_read_all_records() {
    let (_temp, wal_path) = setup_temp_wal();
    let written = records(50);
    write_raw(&wal_path, &written);

    let read: Vec<_> = WalReader::open(&wal_path)
        .unwrap()
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(read, written);
}

#[test]
fn test_position_advances() {
    let (_temp, wal_path) = setup_temp_wal();
    let sizes = write_raw(&wal_path, &records(2));

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert_eq!(reader.position(), 0);

    reader.next_record().unwrap().unwrap();
    assert_eq!(reader.position(), sizes[0] as u64);

    reader.next_record().unwrap().unwrap();
    assert_eq!(reader.position(), (sizes[0] + sizes[1]) as u64);
}

#[test]
fn test_open_missing_file() {
    let (_temp, wal_path) = setup_temp_wal();

    assert!(matches!(WalReader::open(&wal_path), Err(QuillError::Io(_))));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupted_record_is_surfaced() {
    let (_temp, wal_path) = setup_temp_wal();
    let sizes = write_raw(&wal_path, &records(3));

    // Flip the last data byte of the second record
    let mut bytes = fs::read(&wal_path).unwrap();
    let offset = sizes[0] + sizes[1] - 1;
    bytes[offset] ^= 0xFF;
    fs::write(&wal_path, &bytes).unwrap();

    let mut iter = WalReader::open(&wal_path).unwrap().records();
    assert_eq!(iter.next().unwrap().unwrap().lsn, 1);

    let err = iter.next().unwrap().unwrap_err();
    assert!(matches!(err, QuillError::WalCorruption { lsn: 2, .. }));

    // Iteration stops after the first error
    assert!(iter.next().is_none());
}

#[test]
fn test_torn_tail_is_surfaced() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw(&wal_path, &records(2));

    // Partial header of a third frame
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0u8; HEADER_SIZE - 3]).unwrap();
    drop(file);

    let mut reader = WalReader::open(&wal_path).unwrap();
    reader.next_record().unwrap().unwrap();
    reader.next_record().unwrap().unwrap();
    assert!(reader.next_record().unwrap_err().is_corruption());
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_clean_log() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw(&wal_path, &records(10));
    let file_len = fs::metadata(&wal_path).unwrap().len();

    let report = WalReader::verify(&wal_path).unwrap();

    assert_eq!(report.records_valid, 10);
    assert_eq!(report.records_corrupted, 0);
    assert_eq!(report.last_lsn, 10);
    assert_eq!(report.valid_bytes, file_len);
    assert!(!report.torn_tail);
    assert!(report.is_clean());
}

#[test]
fn test_verify_counts_and_skips_corrupted() {
    let (_temp, wal_path) = setup_temp_wal();
    let sizes = write_raw(&wal_path, &records(3));

    let mut bytes = fs::read(&wal_path).unwrap();
    bytes[sizes[0] + HEADER_SIZE] ^= 0xFF;
    fs::write(&wal_path, &bytes).unwrap();

    let report = WalReader::verify(&wal_path).unwrap();

    assert_eq!(report.records_valid, 2);
    assert_eq!(report.records_corrupted, 1);
    assert_eq!(report.last_lsn, 3);
    assert!(!report.is_clean());
}

#[test]
fn test_verify_torn_body() {
    let (_temp, wal_path) = setup_temp_wal();
    let sizes = write_raw(&wal_path, &records(2));

    // Cut the second frame short
    let file = OpenOptions::new().write(true).open(&wal_path).unwrap();
    file.set_len((sizes[0] + sizes[1] - 2) as u64).unwrap();
    drop(file);

    let report = WalReader::verify(&wal_path).unwrap();

    assert_eq!(report.records_valid, 1);
    assert_eq!(report.last_lsn, 1);
    assert_eq!(report.valid_bytes, sizes[0] as u64);
    assert!(report.torn_tail);
}

#[test]
fn test_verify_does_not_modify_file() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw(&wal_path, &records(2));
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(b"junk").unwrap();
    drop(file);

    let before = fs::read(&wal_path).unwrap();
    WalReader::verify(&wal_path).unwrap();

    assert_eq!(fs::read(&wal_path).unwrap(), before);
}
