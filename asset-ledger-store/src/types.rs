//! Record types for entity and registry files.

use std::path::{Path, PathBuf};

use asset_ledger_core::{Category, LedgerError, Status};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field_path;

// ── Entity ──────────────────────────────────────────────────────────────────

/// Gameplay attributes for one game object.
///
/// Only `id` is fixed; everything else (stats, combat parameters, loot
/// tables, ...) is an open map whose key order is preserved on rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute, ignoring non-string values.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Set a nested attribute by dotted path; see [`field_path::set_field`].
    ///
    /// The record id is not an attribute and cannot be changed this way.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), LedgerError> {
        if path.split('.').next() == Some("id") {
            return Err(LedgerError::validation("the record id cannot be changed"));
        }
        field_path::set_field(&mut self.attributes, path, value)
    }

    pub fn get_field(&self, path: &str) -> Option<&Value> {
        if path == "id" {
            return None;
        }
        field_path::get_field(&self.attributes, path)
    }
}

/// An entity record together with the file it was read from.
#[derive(Debug, Clone)]
pub struct StoredEntity {
    pub record: EntityRecord,
    pub path: PathBuf,
    /// Category directory the file lives in, which differs from the
    /// requested category when a lookup fell back (enemies -> bosses)
    pub category: Category,
}

impl StoredEntity {
    /// File stem of the backing record (`enemy_rat_t1_01` for `enemy_rat_t1_01.json`).
    pub fn source_file(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Media files referenced by a registry record, keyed by role.
///
/// Paths are relative to the asset root (optionally carrying an install
/// prefix such as `assets/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_clean: Option<String>,
    /// Roles not known to the ledger, preserved as-is
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl MediaFiles {
    pub fn is_empty(&self) -> bool {
        self.original.is_none()
            && self.clean.is_none()
            && self.consumed_original.is_none()
            && self.consumed_clean.is_none()
            && self.other.is_empty()
    }

    /// The file shown for sorting and previews: the raw original if known, else the clean variant.
    pub fn preview(&self) -> Option<&str> {
        self.original
            .as_deref()
            .or(self.clean.as_deref())
            .filter(|p| !p.is_empty())
    }

    /// Point every role that referenced `old` at `new`. Returns whether anything changed.
    pub fn replace_reference(&mut self, old: &str, new: &str) -> bool {
        let mut changed = false;
        for slot in [
            &mut self.original,
            &mut self.clean,
            &mut self.consumed_original,
            &mut self.consumed_clean,
        ] {
            if let Some(path) = slot {
                if references(path, old) {
                    let replaced = replace_tail(path, old, new);
                    *path = replaced;
                    changed = true;
                }
            }
        }
        for value in self.other.values_mut() {
            let replaced = value
                .as_str()
                .filter(|path| references(path, old))
                .map(|path| replace_tail(path, old, new));
            if let Some(replaced) = replaced {
                *value = Value::String(replaced);
                changed = true;
            }
        }
        changed
    }
}

/// A stored path references `old` when it equals it or ends with `/old`
/// (stored paths may carry a prefix the caller does not know about).
fn references(path: &str, old: &str) -> bool {
    path == old || path.ends_with(&format!("/{}", old))
}

fn replace_tail(path: &str, old: &str, new: &str) -> String {
    format!("{}{}", &path[..path.len() - old.len()], new)
}

/// Presentation and approval metadata for one id, stored separately from
/// gameplay attributes.
///
/// Absence of a registry record is normal: untouched content is `pending`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub status: Status,
    /// Prompt/description text used when (re)generating the art
    #[serde(
        default,
        rename = "sourceDescription",
        alias = "description",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_note: Option<String>,
    #[serde(default, skip_serializing_if = "MediaFiles::is_empty")]
    pub files: MediaFiles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_decline_note: Option<String>,
    /// Audio records: path of the sound file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Audio records: playback volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Further presentation keys (`bodyType`, `gender`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistryRecord {
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category: Some(category),
            ..Default::default()
        }
    }

    /// Repair records that break the decline-note invariant, as hand-edited
    /// or legacy files sometimes do. A note on a non-declined status is
    /// dropped; a declined status without a note is kept and reported.
    pub(crate) fn normalize(&mut self, path: &Path) {
        if self.status != Status::Declined && self.decline_note.take().is_some() {
            log::warn!(
                "{}: dropped decline note on '{}' record",
                path.display(),
                self.status
            );
        }
        if self.status == Status::Declined && is_blank(self.decline_note.as_deref()) {
            log::warn!("{}: declined without a decline note", path.display());
        }
        if self.consumed_status != Some(Status::Declined)
            && self.consumed_decline_note.take().is_some()
        {
            log::warn!("{}: dropped consumed decline note", path.display());
        }
    }
}

pub(crate) fn is_blank(s: Option<&str>) -> bool {
    s.is_none_or(|s| s.trim().is_empty())
}

// ── Bulk scans ──────────────────────────────────────────────────────────────

/// A record file that a bulk scan could not use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scanning a whole category: the usable records plus what was
/// skipped and why. One bad file never aborts the scan.
#[derive(Debug, Clone)]
pub struct ScanReport<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Default for ScanReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ScanReport<T> {
    pub(crate) fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Skipping {}: {}", path.display(), reason);
        self.skipped.push(SkippedRecord {
            path: path.to_path_buf(),
            reason,
        });
    }
}
