//! JSON record I/O shared by both stores.

use std::fs;
use std::path::{Component, Path, PathBuf};

use asset_ledger_core::LedgerError;
use asset_ledger_core::util::{is_record_file, strip_bom};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Read and decode one record file, tolerating a leading byte-order mark.
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, LedgerError> {
    let contents =
        fs::read_to_string(path).map_err(|e| LedgerError::io(path.display().to_string(), e))?;
    serde_json::from_str(strip_bom(&contents))
        .map_err(|e| LedgerError::parse(path.display().to_string(), e.to_string()))
}

/// Encode and write one record file atomically (write to temp, then rename).
pub fn write_record<T: Serialize>(path: &Path, value: &T) -> Result<(), LedgerError> {
    let mut serialized = serde_json::to_string_pretty(value)
        .map_err(|e| LedgerError::parse(path.display().to_string(), e.to_string()))?;
    serialized.push('\n');
    write_atomic(path, serialized.as_bytes())
}

/// Write bytes to `path` through a sibling temp file so readers never see a
/// partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LedgerError> {
    let io_err = |e| LedgerError::io(path.display().to_string(), e);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// Check that `id` names a single file inside its category directory.
pub fn checked_id(id: &str) -> Result<&str, LedgerError> {
    let mut components = Path::new(id).components();
    let single =
        matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
    if id.trim().is_empty() || !single || id.contains(['/', '\\']) {
        return Err(LedgerError::validation(format!("invalid record id '{}'", id)));
    }
    Ok(id)
}

/// Whether `path` lies under `root` without any `..` or root segments.
pub fn is_contained(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .is_ok_and(|rest| rest.components().all(|c| matches!(c, Component::Normal(_))))
}

/// Collect record files in `dir`, sorted by path. Descends into
/// subdirectories when `recursive` is set. A missing directory yields an
/// empty list.
pub fn record_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, LedgerError> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect(dir, recursive, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<(), LedgerError> {
    let entries = fs::read_dir(dir).map_err(|e| LedgerError::io(dir.display().to_string(), e))?;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect(&path, recursive, out)?;
            }
        } else if is_record_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}
