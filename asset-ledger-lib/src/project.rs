//! Project layout, read from an optional `ledger.toml` at the project root.
//!
//! Every key has a default matching the game repository's layout, so a
//! project without a config file works out of the box:
//!
//! ```toml
//! entities_root = "src/entities"
//! registry_root = "src/assets/registry"
//! asset_root = "assets"
//! media_root = "assets/images"
//!
//! [manifest]
//! output = "src/core/AssetLoader.js"
//! base_path = "assets/"
//! placeholder = "images/PH.png"
//! strip_prefixes = ["assets/"]
//!
//! [manifest.essential_images]
//! world_hero = "images/characters/world_hero_2_clean.png"
//!
//! [server]
//! bind = "127.0.0.1:5173"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use asset_ledger_core::LedgerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "ledger.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Cannot encode {path}: {source}")]
    Encode {
        path: String,
        source: toml::ser::Error,
    },
    #[error("Failed to save settings: {0}")]
    Save(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub entities_root: PathBuf,
    pub registry_root: PathBuf,
    /// Directory that registry file paths are relative to
    pub asset_root: PathBuf,
    /// Directory holding `<category>/<id>_<marker>.<ext>` media files
    pub media_root: PathBuf,
    pub manifest: ManifestConfig,
    pub server: ServerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            entities_root: PathBuf::from("src/entities"),
            registry_root: PathBuf::from("src/assets/registry"),
            asset_root: PathBuf::from("assets"),
            media_root: PathBuf::from("assets/images"),
            manifest: ManifestConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// An audio entry in the manifest or the essential list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEntry {
    pub path: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Generated module location, relative to the project root
    pub output: PathBuf,
    /// Prefix the runtime puts in front of every manifest path
    pub base_path: String,
    /// Image served for unknown or unprocessed ids, relative to `base_path`
    pub placeholder: String,
    /// Install-root prefixes removed from registry paths
    pub strip_prefixes: Vec<String>,
    /// Images the runtime always needs, injected when no registry record provides them
    pub essential_images: BTreeMap<String, String>,
    pub essential_audio: BTreeMap<String, AudioEntry>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        let essential_images = [
            ("world_base_layer", "images/backgrounds/base_layer.png"),
            ("world_island_home", "images/backgrounds/zone_home_clean.png"),
            ("world_bridge_planks", "images/environment/environment_planks.png"),
            ("world_hero", "images/characters/world_hero_2_clean.png"),
            ("ui_avatar_knight", "images/characters/avatar_knight.png"),
            ("vfx_fog", "images/vfx/fog.png"),
            ("vfx_fog_puff", "images/vfx/fog_dense.png"),
        ]
        .into_iter()
        .map(|(id, path)| (id.to_string(), path.to_string()))
        .collect();

        let essential_audio = [
            ("sfx_hero_shoot", "audio/hero_shoot.wav", 0.8),
            ("sfx_ui_click", "audio/ui_click.wav", 0.5),
        ]
        .into_iter()
        .map(|(id, path, volume)| {
            (
                id.to_string(),
                AudioEntry {
                    path: path.to_string(),
                    volume,
                },
            )
        })
        .collect();

        Self {
            output: PathBuf::from("src/core/AssetLoader.js"),
            base_path: "assets/".to_string(),
            placeholder: "images/PH.png".to_string(),
            strip_prefixes: vec!["assets/".to_string()],
            essential_images,
            essential_audio,
        }
    }
}

impl ManifestConfig {
    /// Remove the first matching install prefix from a stored path.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        self.strip_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
            .unwrap_or(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5173".to_string(),
        }
    }
}

/// A project root plus its resolved configuration.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load `<root>/ledger.toml`, falling back to defaults when it does not
    /// exist. A file that exists but does not parse is an error.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        let path = root.join(CONFIG_FILE_NAME);
        let config = if path.is_file() {
            let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                source: e,
            })?
        } else {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
            ProjectConfig::default()
        };
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn entities_dir(&self) -> PathBuf {
        self.root.join(&self.config.entities_root)
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.root.join(&self.config.registry_root)
    }

    pub fn asset_dir(&self) -> PathBuf {
        self.root.join(&self.config.asset_root)
    }

    pub fn media_dir(&self) -> PathBuf {
        self.root.join(&self.config.media_root)
    }

    pub fn manifest_output(&self) -> PathBuf {
        self.root.join(&self.config.manifest.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let project = Project::load(tmp.path()).unwrap();
        assert_eq!(project.config(), &ProjectConfig::default());
        assert_eq!(project.entities_dir(), tmp.path().join("src/entities"));
        assert_eq!(project.config().manifest.essential_images.len(), 7);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
media_root = "art"

[manifest]
placeholder = "images/missing.png"

[manifest.essential_audio]
sfx_ui_click = { path = "audio/click.ogg" }
"#,
        )
        .unwrap();
        let project = Project::load(tmp.path()).unwrap();
        let config = project.config();
        assert_eq!(project.media_dir(), tmp.path().join("art"));
        assert_eq!(config.entities_root, PathBuf::from("src/entities"));
        assert_eq!(config.manifest.placeholder, "images/missing.png");
        assert_eq!(config.manifest.base_path, "assets/");
        assert_eq!(config.manifest.essential_audio.len(), 1);
        assert_eq!(config.manifest.essential_audio["sfx_ui_click"].volume, 1.0);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "media_root = [").unwrap();
        assert!(matches!(
            Project::load(tmp.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn strip_prefix_removes_install_root() {
        let config = ManifestConfig::default();
        assert_eq!(config.strip_prefix("assets/images/a.png"), "images/a.png");
        assert_eq!(config.strip_prefix("images/a.png"), "images/a.png");
    }
}
