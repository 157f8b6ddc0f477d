//! Flat-file record stores for game content.
//!
//! Two independent JSON trees keyed by category and id:
//!
//! ```text
//! <entities-root>/<category>/<id>.json   gameplay attributes (EntityStore)
//! <registry-root>/<category>/<id>.json   approval metadata   (RegistryOverlay)
//! ```
//!
//! Writes are whole-record and go through a temp file + rename. There is no
//! locking: concurrent read-modify-write of the same record is last-write-wins.

pub mod entities;
pub mod field_path;
pub mod json;
pub mod registry;
pub mod types;

pub use entities::{CategorySummary, EntityStore};
pub use field_path::{get_field, set_field};
pub use registry::RegistryOverlay;
pub use types::*;
