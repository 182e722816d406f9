//! End-to-end transaction scenarios
//!
//! Two transactions against the default tracked key: a 100-update batch,
//! then a single update.

use quillkv::snapshot;
use quillkv::wal::{WalReader, BEGIN_TRANSACTION};

use crate::{setup_temp_engine, UPDATE};

#[test]
fn test_hundred_update_transaction() {
    let (_temp, engine) = setup_temp_engine();

    engine.append(BEGIN_TRANSACTION, "T1").unwrap();
    for i in 0..100 {
        engine.append(UPDATE, &(1200 + i).to_string()).unwrap();
    }
    engine.commit().unwrap();

    assert_eq!(engine.get("balance").as_deref(), Some("1299"));
    assert_eq!(engine.committed_lsn(), 102);
    assert_eq!(engine.current_lsn(), 102);
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(engine.version(), 102);
}

#[test]
fn test_second_transaction_overwrites() {
    let (_temp, engine) = setup_temp_engine();

    engine.append(BEGIN_TRANSACTION, "T1").unwrap();
    for i in 0..100 {
        engine.append(UPDATE, &(1200 + i).to_string()).unwrap();
    }
    engine.commit().unwrap();

    engine.append(BEGIN_TRANSACTION, "T2").unwrap();
    engine
        .append("UPDATE account SET balance = 1500 WHERE account_id = 5678", "1500")
        .unwrap();
    engine.commit().unwrap();

    assert_eq!(engine.get("balance").as_deref(), Some("1500"));
    assert_eq!(engine.read().len(), 1);
    assert_eq!(engine.committed_lsn(), 105);

    let on_disk = snapshot::load(engine.snapshot_path()).unwrap();
    assert_eq!(on_disk, engine.read());

    let report = WalReader::verify(engine.wal_path()).unwrap();
    assert_eq!(report.records_valid, 105);
    assert_eq!(report.last_lsn, 105);
    assert!(report.is_clean());
}
