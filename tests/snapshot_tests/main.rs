//! Snapshot integration tests
