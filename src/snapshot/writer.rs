//! Snapshot Writer
//!
//! Atomically replaces the snapshot file with the current store contents.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{QuillError, Result};

/// Writes `key=value` snapshots to a fixed path
pub struct SnapshotWriter {
    /// Final snapshot path
    path: PathBuf,

    /// Scratch file renamed over `path` once fully written
    tmp_path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        Self { path, tmp_path }
    }

    /// Replace the snapshot with `entries`
    ///
    /// Steps:
    /// 1. Write every pair to the temp file
    /// 2. fsync the temp file
    /// 3. Rename over the snapshot path
    /// 4. fsync the parent directory
    ///
    /// A failure before the rename leaves the previous snapshot in place.
    /// After the rename the new snapshot is the one on disk, so a failed
    /// directory fsync only logs a warning.
    pub fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Err(e) = self.write_tmp(entries) {
            let _ = fs::remove_file(&self.tmp_path);
            return Err(QuillError::Snapshot(format!(
                "failed to write {}: {}",
                self.tmp_path.display(),
                e
            )));
        }

        fs::rename(&self.tmp_path, &self.path).map_err(|e| {
            QuillError::Snapshot(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        if let Some(dir) = self.path.parent() {
            sync_parent(dir);
        }

        tracing::debug!("Wrote snapshot {} ({} keys)", self.path.display(), entries.len());
        Ok(())
    }

    /// Final snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_tmp(&self, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&self.tmp_path)?);
        for (key, value) in entries {
            writeln!(writer, "{}={}", key, value)?;
        }

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

/// Parse a snapshot file back into a map
pub fn load(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = fs::read_to_string(path)?;
    let mut entries = BTreeMap::new();

    for (index, line) in contents.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            QuillError::Snapshot(format!(
                "{}:{}: expected key=value",
                path.display(),
                index + 1
            ))
        })?;
        entries.insert(key.to_string(), value.to_string());
    }

    Ok(entries)
}

/// Best-effort directory fsync after a completed rename
fn sync_parent(dir: &Path) {
    if let Err(e) = sync_dir(dir) {
        tracing::warn!("Failed to sync directory {}: {}", dir.display(), e);
    }
}

/// Fsync a directory so the rename itself is durable
fn sync_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let dir = if path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path
        };
        File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
