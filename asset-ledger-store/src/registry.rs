//! Registry overlay: approval status, descriptions, and media references,
//! one JSON file per id under `<root>/<category>/<id>.json`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use asset_ledger_core::{Category, LedgerError, Status};

use crate::json::{checked_id, read_record, record_files, write_record};
use crate::types::{RegistryRecord, ScanReport, is_blank};

#[derive(Debug, Clone)]
pub struct RegistryOverlay {
    root: PathBuf,
}

impl RegistryOverlay {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<category>/<id>.json`, rejecting ids that would leave the
    /// category directory.
    pub fn record_path(&self, category: Category, id: &str) -> Result<PathBuf, LedgerError> {
        let id = checked_id(id)?;
        Ok(self
            .root
            .join(category.short_name())
            .join(format!("{}.json", id)))
    }

    /// The registry record for `id`, or `None` if it was never touched.
    pub fn get(&self, category: Category, id: &str) -> Result<Option<RegistryRecord>, LedgerError> {
        let path = self.record_path(category, id)?;
        if !path.is_file() {
            return Ok(None);
        }
        let mut record: RegistryRecord = read_record(&path)?;
        record.normalize(&path);
        Ok(Some(record))
    }

    /// Write a whole record to `<category>/<record.id>.json`.
    pub fn put(&self, category: Category, record: &RegistryRecord) -> Result<PathBuf, LedgerError> {
        if record.id.trim().is_empty() {
            return Err(LedgerError::validation("registry record has an empty id"));
        }
        let path = self.record_path(category, &record.id)?;
        write_record(&path, record)?;
        Ok(path)
    }

    fn get_or_new(&self, category: Category, id: &str) -> Result<RegistryRecord, LedgerError> {
        Ok(self
            .get(category, id)?
            .unwrap_or_else(|| RegistryRecord::new(id, category)))
    }

    /// Set the primary status.
    ///
    /// Declining requires a non-blank note; any other status clears the
    /// note (a note passed alongside it is ignored). The record is created
    /// on first touch.
    pub fn set_status(
        &self,
        category: Category,
        id: &str,
        status: Status,
        note: Option<&str>,
    ) -> Result<RegistryRecord, LedgerError> {
        let note = checked_note(id, status, note)?;
        let mut record = self.get_or_new(category, id)?;
        record.status = status;
        record.decline_note = note;
        self.put(category, &record)?;
        log::info!("Registry: {}/{} -> {}", category, id, status);
        Ok(record)
    }

    /// Set the status of the consumed (harvested) variant, with the same
    /// note rules as [`set_status`](Self::set_status).
    pub fn set_consumed_status(
        &self,
        category: Category,
        id: &str,
        status: Status,
        note: Option<&str>,
    ) -> Result<RegistryRecord, LedgerError> {
        let note = checked_note(id, status, note)?;
        let mut record = self.get_or_new(category, id)?;
        record.consumed_status = Some(status);
        record.consumed_decline_note = note;
        self.put(category, &record)?;
        log::info!("Registry: {}/{} consumed -> {}", category, id, status);
        Ok(record)
    }

    /// Read every registry record in a category, skipping (and logging)
    /// unreadable files and repeated ids.
    pub fn load_category(&self, category: Category) -> Result<ScanReport<RegistryRecord>, LedgerError> {
        let mut report = ScanReport::default();
        let mut seen = HashSet::new();
        for path in record_files(&self.root.join(category.short_name()), false)? {
            match read_record::<RegistryRecord>(&path) {
                Ok(mut record) => {
                    if !seen.insert(record.id.clone()) {
                        report.skip(&path, format!("duplicate id '{}'", record.id));
                        continue;
                    }
                    record.normalize(&path);
                    report.records.push(record);
                }
                Err(e) => report.skip(&path, e.to_string()),
            }
        }
        Ok(report)
    }

    /// Registry records of a category keyed by id.
    pub fn lookup(&self, category: Category) -> Result<HashMap<String, RegistryRecord>, LedgerError> {
        Ok(self
            .load_category(category)?
            .records
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect())
    }

    /// Categories that have a directory under the registry root, in
    /// category order. Directories that are not a known category are
    /// logged and ignored.
    pub fn categories(&self) -> Result<Vec<Category>, LedgerError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries =
            fs::read_dir(&self.root).map_err(|e| LedgerError::io(self.root.display().to_string(), e))?;
        let mut categories = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.parse::<Category>() {
                Ok(category) => categories.push(category),
                Err(_) => log::warn!("Ignoring unknown registry category '{}'", name),
            }
        }
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Repoint media references after a file was renamed. Returns whether
    /// the record existed and referenced `old`.
    pub fn update_file_reference(
        &self,
        category: Category,
        id: &str,
        old: &str,
        new: &str,
    ) -> Result<bool, LedgerError> {
        let Some(mut record) = self.get(category, id)? else {
            return Ok(false);
        };
        if !record.files.replace_reference(old, new) {
            return Ok(false);
        }
        self.put(category, &record)?;
        log::debug!("Registry: {}/{} now references {}", category, id, new);
        Ok(true)
    }
}

fn checked_note(id: &str, status: Status, note: Option<&str>) -> Result<Option<String>, LedgerError> {
    if !status.requires_note() {
        return Ok(None);
    }
    if is_blank(note) {
        return Err(LedgerError::validation(format!(
            "a decline note is required to decline '{}'",
            id
        )));
    }
    Ok(note.map(|n| n.trim().to_string()))
}
