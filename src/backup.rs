//! Timestamped backups of a file's previous contents.
//!
//! A content signature is recorded per file path; writing the same bytes
//! for the same path twice produces a single backup, even across repeated
//! failed loads. Retention is an external concern — nothing here prunes.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Inserted between the file stem and the timestamp in backup names.
pub const BACKUP_SUFFIX: &str = "save";

// Last written content signature per file path. Entries for different
// paths never interact, so one process-wide lock is enough.
static SIGNATURES: Mutex<BTreeMap<PathBuf, blake3::Hash>> = Mutex::new(BTreeMap::new());

/// Back up `contents` as a sibling of `path` named
/// `<stem><suffix>-<UTC timestamp>.<extension>`.
///
/// Returns `None` without writing when the contents are blank or identical
/// to the last backup recorded for this path.
pub fn backup(path: &Path, contents: &str) -> io::Result<Option<PathBuf>> {
    if contents.trim().is_empty() {
        return Ok(None);
    }

    let signature = blake3::hash(contents.as_bytes());
    {
        let signatures = SIGNATURES.lock();
        if signatures.get(path) == Some(&signature) {
            return Ok(None);
        }
    }

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("config");
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .filter(|extension| !extension.is_empty())
        .unwrap_or("toml");
    let stamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let name = format!("{}{}-{}.{}", stem, BACKUP_SUFFIX, stamp, extension);

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let backup_path = parent.join(name);
    fs::write(&backup_path, contents)?;

    SIGNATURES.lock().insert(path.to_path_buf(), signature);
    Ok(Some(backup_path))
}
