//! Read-time join of entity records with their registry overlay.
//!
//! Merging never writes to either store. The only I/O is the file
//! timestamp lookup, which is injected through [`ModifiedTime`] so the join
//! itself stays a pure function.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use asset_ledger_core::{Category, Status};
use asset_ledger_store::{RegistryRecord, StoredEntity};
use serde::Serialize;
use serde_json::{Map, Value};

/// Source of file modification times, in milliseconds since the epoch.
pub trait ModifiedTime {
    /// Modification time of the file a registry path refers to, 0 when the
    /// file does not exist.
    fn modified_ms(&self, path: &str) -> u64;
}

impl<F> ModifiedTime for F
where
    F: Fn(&str) -> u64,
{
    fn modified_ms(&self, path: &str) -> u64 {
        self(path)
    }
}

/// Filesystem timestamps for registry paths, resolved against the asset
/// root after removing any install prefix.
#[derive(Debug, Clone)]
pub struct AssetClock {
    asset_root: PathBuf,
    strip_prefixes: Vec<String>,
}

impl AssetClock {
    pub fn new(asset_root: impl Into<PathBuf>, strip_prefixes: Vec<String>) -> Self {
        Self {
            asset_root: asset_root.into(),
            strip_prefixes,
        }
    }
}

impl ModifiedTime for AssetClock {
    fn modified_ms(&self, path: &str) -> u64 {
        let relative = self
            .strip_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
            .unwrap_or(path);
        std::fs::metadata(self.asset_root.join(relative))
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// One entity as the dashboard sees it: gameplay attributes with the
/// registry's presentation fields laid over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedEntity(Map<String, Value>);

impl MergedEntity {
    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn status(&self) -> Status {
        self.0
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

fn set_or_remove(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            map.insert(key.to_string(), Value::String(v.to_string()));
        }
        None => {
            map.shift_remove(key);
        }
    }
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Merge one entity with its registry record, if any.
pub fn merge_entity(
    entity: &StoredEntity,
    registry: Option<&RegistryRecord>,
    mtime: &dyn ModifiedTime,
) -> MergedEntity {
    let mut map = entity.record.attributes.clone();
    map.insert("id".to_string(), Value::String(entity.record.id.clone()));

    let status = match registry {
        Some(record) => record.status,
        None => entity
            .record
            .str_field("status")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
    };
    map.insert("status".to_string(), Value::String(status.to_string()));

    let description = registry
        .and_then(|r| r.description.as_deref())
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            ["sourceDescription", "description", "name"]
                .into_iter()
                .find_map(|key| non_empty(map.get(key)))
                .map(str::to_string)
        })
        .unwrap_or_default();
    map.insert("sourceDescription".to_string(), Value::String(description));

    if let Some(record) = registry {
        set_or_remove(&mut map, "declineNote", record.decline_note.as_deref());

        if !record.files.is_empty() {
            if let Ok(files) = serde_json::to_value(&record.files) {
                map.insert("files".to_string(), files);
            }
        }

        if let Some(consumed) = record.consumed_status {
            map.insert(
                "consumedStatus".to_string(),
                Value::String(consumed.to_string()),
            );
            set_or_remove(
                &mut map,
                "consumedDeclineNote",
                record.consumed_decline_note.as_deref(),
            );
        }

        for (key, value) in &record.extra {
            map.insert(key.clone(), value.clone());
        }
    }

    let preview = map.get("files").and_then(|files| {
        non_empty(files.get("original")).or_else(|| non_empty(files.get("clean")))
    });
    let modified = preview.map(|p| mtime.modified_ms(p)).unwrap_or(0);
    map.insert("imageModifiedTime".to_string(), Value::from(modified));
    map.insert(
        "_sourceFile".to_string(),
        Value::String(entity.source_file()),
    );

    MergedEntity(map)
}

/// Merge every entity of a category against a registry lookup table.
/// Output order follows `entities`.
pub fn merge_entities(
    entities: &[StoredEntity],
    registry: &HashMap<String, RegistryRecord>,
    mtime: &dyn ModifiedTime,
) -> Vec<MergedEntity> {
    entities
        .iter()
        .map(|entity| merge_entity(entity, registry.get(&entity.record.id), mtime))
        .collect()
}

/// Group merged entities by the `sourceFile` attribute the generation
/// tooling writes, defaulting to the category name. Each group keeps the
/// input order.
pub fn group_by_source(
    entities: &[MergedEntity],
    category: Category,
) -> BTreeMap<String, Vec<MergedEntity>> {
    let mut groups: BTreeMap<String, Vec<MergedEntity>> = BTreeMap::new();
    for entity in entities {
        let source = non_empty(entity.get("sourceFile"))
            .map(str::to_string)
            .unwrap_or_else(|| category.to_string());
        groups.entry(source).or_default().push(entity.clone());
    }
    groups
}
