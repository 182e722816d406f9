//! Tests for the commit protocol
//!
//! These tests verify:
//! - The commit marker is logged and synced before replay
//! - Replay applies every buffered record in LSN order
//! - The snapshot and watermark move only after a full commit
//! - A failed snapshot leaves the buffer for the next commit

use std::fs;

use quillkv::snapshot;
use quillkv::wal::{Operation, WalReader};
use quillkv::QuillError;

use crate::{setup_temp_engine, UPDATE};

#[test]
fn test_commit_clears_buffer_and_advances_watermark() {
    let (_temp, engine) = setup_temp_engine();

    engine.begin("T1").unwrap();
    engine.append(UPDATE, "1200").unwrap();
    let commit_lsn = engine.commit().unwrap();

    assert_eq!(commit_lsn, 3);
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(engine.current_lsn(), 3);
    assert_eq!(engine.committed_lsn(), engine.current_lsn());
}

#[test]
fn test_commit_writes_marker_to_log() {
    let (_temp, engine) = setup_temp_engine();

    engine.begin("T1").unwrap();
    engine.set("a", "1").unwrap();
    engine.commit().unwrap();

    let records: Vec<_> = WalReader::open(engine.wal_path())
        .unwrap()
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[2].operation, Operation::Commit);
    assert_eq!(records[2].lsn, 3);
    for record in &records {
        assert_eq!(record.compute_crc().unwrap(), record.checksum);
    }
}

#[test]
fn test_commit_replays_in_order() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("k", "first").unwrap();
    engine.set("k", "second").unwrap();
    engine.set("k", "third").unwrap();
    engine.commit().unwrap();

    assert_eq!(engine.get("k").as_deref(), Some("third"));
}

#[test]
fn test_version_counts_markers() {
    let (_temp, engine) = setup_temp_engine();

    engine.begin("T1").unwrap();
    engine.set("a", "1").unwrap();
    engine.commit().unwrap();

    // begin + set + commit marker
    assert_eq!(engine.version(), 3);
}

#[test]
fn test_empty_commit() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.commit().unwrap(), 1);
    assert_eq!(engine.committed_lsn(), 1);
    assert_eq!(engine.version(), 1);
    assert!(engine.snapshot_path().exists());
    assert!(engine.read().is_empty());
}

#[test]
fn test_snapshot_matches_store_after_commit() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("alice", "10").unwrap();
    engine.set("bob", "20").unwrap();
    engine.commit().unwrap();

    assert_eq!(snapshot::load(engine.snapshot_path()).unwrap(), engine.read());
    assert_eq!(
        fs::read_to_string(engine.snapshot_path()).unwrap(),
        "alice=10\nbob=20\n"
    );
}

#[test]
fn test_uncommitted_records_not_in_snapshot() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("a", "1").unwrap();
    engine.commit().unwrap();
    engine.set("a", "2").unwrap();

    assert_eq!(snapshot::load(engine.snapshot_path()).unwrap().get("a").map(String::as_str), Some("1"));
    assert_eq!(engine.get("a").as_deref(), Some("1"));
    assert_eq!(engine.committed_lsn(), 2);
    assert_eq!(engine.current_lsn(), 3);
}

#[test]
fn test_failed_snapshot_keeps_buffer_and_watermark() {
    let (temp, engine) = setup_temp_engine();

    engine.set("a", "1").unwrap();
    engine.commit().unwrap();

    // Block the snapshot temp file so the next flush fails
    let blocker = temp.path().join("database_state.tmp");
    fs::create_dir(&blocker).unwrap();

    engine.set("a", "2").unwrap();
    let result = engine.commit();

    assert!(matches!(result, Err(QuillError::Snapshot(_))));
    // Replay already ran; snapshot and watermark did not move
    assert_eq!(engine.get("a").as_deref(), Some("2"));
    assert_eq!(engine.committed_lsn(), 2);
    assert_eq!(engine.pending_count(), 2);
    assert_eq!(snapshot::load(engine.snapshot_path()).unwrap().get("a").map(String::as_str), Some("1"));

    // The leftover buffer is replayed again by the next commit
    fs::remove_dir(&blocker).unwrap();
    let version_before = engine.version();
    engine.commit().unwrap();

    assert_eq!(engine.version(), version_before + 3);
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(engine.committed_lsn(), 5);
    assert_eq!(snapshot::load(engine.snapshot_path()).unwrap().get("a").map(String::as_str), Some("2"));
}
