//! Request/response surface over the stores, shared by the CLI and the
//! HTTP server.
//!
//! Every operation takes its arguments as plain strings so that bad input
//! (an unknown category, a misspelled status) comes back as a structured
//! [`ApiFailure`] like any other anticipated error. Only I/O failures
//! escape as `Err`.

use std::collections::BTreeMap;
use std::path::Path;

use asset_ledger_core::util::to_slash;
use asset_ledger_core::{Category, CategoryParseError, LedgerError, Status, StatusParseError};
use asset_ledger_store::{CategorySummary, EntityStore, RegistryOverlay, SkippedRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lifecycle::{self, MediaName};
use crate::manifest::{write_manifest, ManifestBuilder};
use crate::merge::{group_by_source, merge_entities, AssetClock, MergedEntity};
use crate::project::Project;

// ── Responses ───────────────────────────────────────────────────────────────

/// Either the operation's payload or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiFailure {
    pub success: bool,
    pub error: String,
}

impl ApiFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Turn an operation result into a response. Expected errors become
/// failures; anything else propagates.
pub fn respond<T>(result: Result<T, LedgerError>) -> Result<ApiResponse<T>, LedgerError> {
    match result {
        Ok(value) => Ok(ApiResponse::Success(value)),
        Err(e) if e.is_expected() => {
            log::debug!("Request failed: {}", e);
            Ok(ApiResponse::Failure(ApiFailure::new(e.to_string())))
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub category: Category,
    pub entities: Vec<MergedEntity>,
    pub files_by_source: BTreeMap<String, Vec<MergedEntity>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub success: bool,
    pub old_path: String,
    pub new_name: String,
    pub new_path: String,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebuildResponse {
    pub success: bool,
    pub images: usize,
    pub audio: usize,
    pub changed: bool,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAsset {
    pub success: bool,
    pub id: String,
    pub path: String,
    /// Whether `path` is the placeholder rather than the asset's own file
    pub placeholder: bool,
}

// ── Requests ────────────────────────────────────────────────────────────────
//
// Every field defaults so that a body missing one reaches the dashboard and
// fails as "Missing required parameters" instead of at deserialization.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRequest {
    pub category: String,
}

/// Status change for an entity. `file` names the entity's source file and
/// is accepted for compatibility; the id alone locates the record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub category: String,
    pub file: String,
    pub id: String,
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntityUpdateRequest {
    pub category: String,
    pub file: String,
    pub id: String,
    pub updates: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaStatusRequest {
    pub path: String,
    pub status: String,
}

// ── Dashboard ───────────────────────────────────────────────────────────────

const MISSING_PARAMETERS: &str = "Missing required parameters";

fn required(value: &str) -> Result<&str, LedgerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LedgerError::validation(MISSING_PARAMETERS));
    }
    Ok(value)
}

fn parse_category(name: &str) -> Result<Category, LedgerError> {
    required(name)?
        .parse()
        .map_err(|e: CategoryParseError| LedgerError::validation(e.to_string()))
}

fn parse_status(name: &str) -> Result<Status, LedgerError> {
    required(name)?
        .parse()
        .map_err(|e: StatusParseError| LedgerError::validation(e.to_string()))
}

/// The stores of one project, opened together.
#[derive(Debug, Clone)]
pub struct Dashboard {
    project: Project,
    entities: EntityStore,
    registry: RegistryOverlay,
}

impl Dashboard {
    pub fn new(project: Project) -> Self {
        let entities = EntityStore::new(project.entities_dir());
        let registry = RegistryOverlay::new(project.registry_dir());
        Self {
            project,
            entities,
            registry,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn registry(&self) -> &RegistryOverlay {
        &self.registry
    }

    pub fn categories(&self) -> Result<ApiResponse<CategoriesResponse>, LedgerError> {
        respond(
            self.entities
                .summaries()
                .map(|categories| CategoriesResponse { categories }),
        )
    }

    /// Merged view of every entity in a category.
    pub fn get_category(&self, category: &str) -> Result<ApiResponse<CategoryView>, LedgerError> {
        respond(self.category_view(category))
    }

    fn category_view(&self, category: &str) -> Result<CategoryView, LedgerError> {
        let category = parse_category(category)?;
        let scan = self.entities.scan(category)?;
        let registry = self.registry.lookup(category)?;
        let clock = AssetClock::new(
            self.project.asset_dir(),
            self.project.config().manifest.strip_prefixes.clone(),
        );
        let entities = merge_entities(&scan.records, &registry, &clock);
        let files_by_source = group_by_source(&entities, category);
        Ok(CategoryView {
            category,
            entities,
            files_by_source,
            skipped: scan.skipped,
        })
    }

    pub fn set_status(
        &self,
        category: &str,
        _file: &str,
        id: &str,
        status: &str,
        note: Option<&str>,
    ) -> Result<ApiResponse<Ack>, LedgerError> {
        respond(self.apply_status(category, id, status, note, false))
    }

    /// Status of the consumed (harvested) variant.
    pub fn set_consumed_status(
        &self,
        category: &str,
        _file: &str,
        id: &str,
        status: &str,
        note: Option<&str>,
    ) -> Result<ApiResponse<Ack>, LedgerError> {
        respond(self.apply_status(category, id, status, note, true))
    }

    fn apply_status(
        &self,
        category: &str,
        id: &str,
        status: &str,
        note: Option<&str>,
        consumed: bool,
    ) -> Result<Ack, LedgerError> {
        let category = parse_category(category)?;
        let id = required(id)?;
        let status = parse_status(status)?;
        // Registry records are keyed by the entity's own id and directory,
        // which may differ from the request after prefix or bosses lookup.
        // Registry-only categories have no entity to resolve.
        let (category, id) = if category.has_entities() {
            let entity = self.entities.read(category, id)?;
            (entity.category, entity.record.id)
        } else {
            (category, id.to_string())
        };
        if consumed {
            self.registry
                .set_consumed_status(category, &id, status, note)?;
            Ok(Ack::new(format!("{} consumed status set to {}", id, status)))
        } else {
            self.registry.set_status(category, &id, status, note)?;
            Ok(Ack::new(format!("{} set to {}", id, status)))
        }
    }

    /// Set one dotted field on an entity record. `null` deletes the key.
    pub fn set_field(
        &self,
        category: &str,
        file: &str,
        id: &str,
        field_path: &str,
        value: Value,
    ) -> Result<ApiResponse<Ack>, LedgerError> {
        let mut updates = Map::new();
        updates.insert(field_path.to_string(), value);
        self.update_entity(category, file, id, &updates)
    }

    /// Apply several dotted-field updates and write the record once. One
    /// invalid path rejects the whole request and nothing is written.
    pub fn update_entity(
        &self,
        category: &str,
        _file: &str,
        id: &str,
        updates: &Map<String, Value>,
    ) -> Result<ApiResponse<Ack>, LedgerError> {
        respond(self.apply_updates(category, id, updates))
    }

    fn apply_updates(
        &self,
        category: &str,
        id: &str,
        updates: &Map<String, Value>,
    ) -> Result<Ack, LedgerError> {
        let category = parse_category(category)?;
        let id = required(id)?;
        if updates.is_empty() {
            return Err(LedgerError::validation("no updates given"));
        }
        let mut entity = self.entities.read(category, id)?;
        for (path, value) in updates {
            entity.record.set_field(path, value.clone())?;
        }
        self.entities.save(&entity)?;
        log::info!(
            "Entity: {}/{} updated {}",
            entity.category,
            entity.record.id,
            updates.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        Ok(Ack::new(format!(
            "Updated {} field(s) on {}",
            updates.len(),
            entity.record.id
        )))
    }

    /// Rename a media file to carry a new lifecycle state.
    pub fn transition_media(
        &self,
        path: &str,
        status: &str,
    ) -> Result<ApiResponse<TransitionResponse>, LedgerError> {
        respond(self.move_media(path, status))
    }

    fn move_media(&self, path: &str, status: &str) -> Result<TransitionResponse, LedgerError> {
        let path = required(path)?;
        let status = parse_status(status)?;
        let transition = lifecycle::transition_media(&self.project.media_dir(), path, status)?;
        if transition.changed {
            self.sync_reference(&transition.old_path, &transition.new_path);
        }
        Ok(TransitionResponse {
            success: true,
            old_path: transition.old_path,
            new_name: transition.new_name,
            new_path: transition.new_path,
            changed: transition.changed,
        })
    }

    /// Point the owning registry record at a renamed file. Failures are
    /// logged; the rename itself already happened.
    fn sync_reference(&self, old_path: &str, new_path: &str) {
        let relative = Path::new(old_path);
        let Some(category) = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
            .and_then(|c| c.parse::<Category>().ok())
        else {
            log::debug!("No registry category for {}", old_path);
            return;
        };
        let Some(file_name) = relative.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let id = MediaName::parse(file_name).stem;
        match self
            .registry
            .update_file_reference(category, &id, old_path, new_path)
        {
            Ok(true) => log::info!("Registry: {}/{} -> {}", category, id, new_path),
            Ok(false) => log::debug!("Registry: {}/{} does not reference {}", category, id, old_path),
            Err(e) => log::warn!("Registry reference for {} not updated: {}", old_path, e),
        }
    }

    /// Regenerate the `AssetLoader` module.
    pub fn rebuild_manifest(&self) -> Result<ApiResponse<RebuildResponse>, LedgerError> {
        respond(self.build_manifest())
    }

    fn build_manifest(&self) -> Result<RebuildResponse, LedgerError> {
        let manifest = ManifestBuilder::new(&self.registry, &self.project.config().manifest).collect()?;
        let summary = write_manifest(&self.project.manifest_output(), &manifest)?;
        let output = pathdiff::diff_paths(&summary.output, self.project.root())
            .unwrap_or_else(|| summary.output.clone());
        Ok(RebuildResponse {
            success: true,
            images: summary.images,
            audio: summary.audio,
            changed: summary.changed,
            output: to_slash(&output),
        })
    }

    /// What the runtime would load for `id`, without writing anything.
    pub fn resolve_asset(&self, id: &str) -> Result<ApiResponse<ResolvedAsset>, LedgerError> {
        respond(self.lookup_asset(id))
    }

    fn lookup_asset(&self, id: &str) -> Result<ResolvedAsset, LedgerError> {
        let manifest = ManifestBuilder::new(&self.registry, &self.project.config().manifest).collect()?;
        Ok(ResolvedAsset {
            success: true,
            id: id.to_string(),
            path: manifest.get_path(id),
            placeholder: !manifest.resolves(id),
        })
    }
}
