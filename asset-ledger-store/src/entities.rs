//! Gameplay entity records: one JSON file per id under
//! `<root>/<category>/`, nested for multi-level categories.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use asset_ledger_core::{Category, LedgerError};
use serde::Serialize;

use crate::json::{checked_id, is_contained, read_record, record_files, write_record};
use crate::types::{EntityRecord, ScanReport, StoredEntity};

/// Record count for one entity category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub name: &'static str,
    pub count: usize,
}

/// Flat-file store of entity records.
#[derive(Debug, Clone)]
pub struct EntityStore {
    root: PathBuf,
}

impl EntityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.short_name())
    }

    /// Whether the category has a directory in this store at all.
    pub fn has_category(&self, category: Category) -> bool {
        self.category_dir(category).is_dir()
    }

    fn files(&self, category: Category) -> Result<Vec<PathBuf>, LedgerError> {
        record_files(&self.category_dir(category), category.is_nested())
    }

    /// Read every record in a category.
    ///
    /// Unreadable or malformed files are logged and reported in
    /// [`ScanReport::skipped`]; so is any record whose id was already seen,
    /// so the result never holds two records with the same id.
    pub fn scan(&self, category: Category) -> Result<ScanReport<StoredEntity>, LedgerError> {
        let mut report = ScanReport::default();
        let mut seen = HashSet::new();

        for path in self.files(category)? {
            match read_record::<EntityRecord>(&path) {
                Ok(record) if record.id.trim().is_empty() => {
                    report.skip(&path, "record has an empty id");
                }
                Ok(record) => {
                    if !seen.insert(record.id.clone()) {
                        report.skip(&path, format!("duplicate id '{}'", record.id));
                        continue;
                    }
                    report.records.push(StoredEntity {
                        record,
                        path,
                        category,
                    });
                }
                Err(e) => report.skip(&path, e.to_string()),
            }
        }

        log::debug!(
            "Scanned {}: {} records, {} skipped",
            category,
            report.records.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Sorted ids of every readable record in a category.
    pub fn list(&self, category: Category) -> Result<Vec<String>, LedgerError> {
        let mut ids: Vec<String> = self
            .scan(category)?
            .records
            .into_iter()
            .map(|e| e.record.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Locate the file holding `id`.
    ///
    /// Search order: `<category>/<id>.json`, the category's id prefix
    /// (`enemy_<id>`), any file whose stem matches (nested categories), any
    /// file whose content carries the id, then the fallback category.
    pub fn find(&self, category: Category, id: &str) -> Result<Option<PathBuf>, LedgerError> {
        let id = checked_id(id)?;
        let dir = self.category_dir(category);
        let mut candidates = vec![id.to_string()];
        if let Some(prefix) = category.id_prefix() {
            if !id.starts_with(prefix) {
                candidates.push(format!("{}{}", prefix, id));
            }
        }

        for name in &candidates {
            let direct = dir.join(format!("{}.json", name));
            if direct.is_file() {
                return Ok(Some(direct));
            }
        }

        let files = self.files(category)?;
        if let Some(path) = files.iter().find(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| candidates.iter().any(|c| c == stem))
        }) {
            return Ok(Some(path.clone()));
        }

        for path in &files {
            match read_record::<EntityRecord>(path) {
                Ok(record) if candidates.contains(&record.id) => return Ok(Some(path.clone())),
                Ok(_) => {}
                Err(e) => log::debug!("find({}, {}): ignoring {}", category, id, e),
            }
        }

        match category.fallback() {
            Some(fallback) => self.find(fallback, id),
            None => Ok(None),
        }
    }

    /// Read one record, or `NotFound`.
    pub fn read(&self, category: Category, id: &str) -> Result<StoredEntity, LedgerError> {
        let path = self
            .find(category, id)?
            .ok_or_else(|| LedgerError::not_found(format!("Entity not found: {}", id)))?;
        let record = read_record(&path)?;
        let category = self.category_of(&path).unwrap_or(category);
        Ok(StoredEntity {
            record,
            path,
            category,
        })
    }

    /// Category of a record file, from its first directory under the root.
    pub fn category_of(&self, path: &Path) -> Option<Category> {
        let relative = path.strip_prefix(&self.root).ok()?;
        relative.components().next()?.as_os_str().to_str()?.parse().ok()
    }

    /// Overwrite the whole record for `id`.
    ///
    /// The record is written where it already lives, or at
    /// `<category>/<id>.json` for a new one.
    pub fn write(
        &self,
        category: Category,
        id: &str,
        record: &EntityRecord,
    ) -> Result<PathBuf, LedgerError> {
        if record.id != id {
            return Err(LedgerError::validation(format!(
                "record id '{}' does not match '{}'",
                record.id, id
            )));
        }
        let path = match self.find(category, id)? {
            Some(existing) => existing,
            None => self.category_dir(category).join(format!("{}.json", id)),
        };
        write_record(&path, record)?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Write back a record previously obtained from [`read`](Self::read).
    pub fn save(&self, entity: &StoredEntity) -> Result<(), LedgerError> {
        if !is_contained(&self.root, &entity.path) {
            return Err(LedgerError::validation(format!(
                "{} is outside the entity store",
                entity.path.display()
            )));
        }
        write_record(&entity.path, &entity.record)
    }

    /// Record counts for every entity category with a directory.
    pub fn summaries(&self) -> Result<Vec<CategorySummary>, LedgerError> {
        let mut out = Vec::new();
        for category in Category::entity_categories() {
            if !self.has_category(category) {
                continue;
            }
            out.push(CategorySummary {
                category,
                name: category.display_name(),
                count: self.files(category)?.len(),
            });
        }
        Ok(out)
    }
}
