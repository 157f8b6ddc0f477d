//! Approval workflow and build step on top of the ledger stores.
//!
//! - [`lifecycle`]: media file state machine, persisted by renaming files
//! - [`merge`]: read-time join of entity and registry records
//! - [`manifest`]: compile published registry records into the runtime `AssetLoader` module
//! - [`dashboard`]: the request/response surface used by the UI and batch tools
//! - [`project`] / [`settings`]: project layout and per-user configuration

pub mod dashboard;
pub mod lifecycle;
pub mod manifest;
pub mod merge;
pub mod project;
pub mod settings;

pub use asset_ledger_core::{Category, LedgerError, Status};
pub use asset_ledger_store::{EntityStore, RegistryOverlay};
pub use dashboard::{ApiFailure, ApiResponse, Dashboard};
pub use manifest::{BuildSummary, Manifest, ManifestBuilder};
pub use project::{ConfigError, Project, ProjectConfig};
