//! Per-user settings, kept outside any project.
//!
//! Stored at `~/.config/asset-ledger/settings.toml`:
//!
//! ```toml
//! [project]
//! current_root = "/home/me/games/wildlands"
//! ```
//!
//! Keys this crate does not know are carried through a load/save cycle.

use std::io;
use std::path::{Path, PathBuf};

use asset_ledger_core::util::strip_bom;
use asset_ledger_store::json::write_atomic;
use serde::{Deserialize, Serialize};

use crate::project::ConfigError;

/// Path to the settings file under the platform config directory.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asset-ledger")
        .join("settings.toml")
}

/// Where a resolved project root came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    /// `--root` on the command line
    Flag,
    /// `project.current_root` in the settings file
    Saved,
    /// Neither was given
    WorkingDir,
}

impl RootSource {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Flag => "--root",
            Self::Saved => "saved setting",
            Self::WorkingDir => "working directory",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub project: ProjectSettings,
    #[serde(flatten)]
    other: toml::Table,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_root: Option<PathBuf>,
    #[serde(flatten)]
    other: toml::Table,
}

impl UserSettings {
    /// Read the settings file. A missing file is empty settings.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        toml::from_str(strip_bom(&contents)).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// The user's settings, or empty settings (with a warning) when the
    /// file cannot be read.
    pub fn load_or_default() -> Self {
        let path = settings_path();
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring user settings: {}", e);
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Encode {
            path: path.display().to_string(),
            source: e,
        })?;
        write_atomic(path, text.as_bytes())?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }

    /// The saved project root, ignoring an empty value.
    pub fn current_root(&self) -> Option<&Path> {
        self.project
            .current_root
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn set_current_root(&mut self, root: Option<PathBuf>) {
        self.project.current_root = root;
    }

    /// Pick the project root: the command-line flag, then the saved root,
    /// then the working directory.
    pub fn resolve_root(&self, flag: Option<PathBuf>) -> (PathBuf, RootSource) {
        if let Some(root) = flag {
            return (root, RootSource::Flag);
        }
        if let Some(root) = self.current_root() {
            return (root.to_path_buf(), RootSource::Saved);
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        (cwd, RootSource::WorkingDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn flag_wins_over_saved_root() {
        let mut settings = UserSettings::default();
        settings.set_current_root(Some(PathBuf::from("/games/saved")));
        let (root, source) = settings.resolve_root(Some(PathBuf::from("/tmp/game")));
        assert_eq!(root, PathBuf::from("/tmp/game"));
        assert_eq!(source, RootSource::Flag);

        let (root, source) = settings.resolve_root(None);
        assert_eq!(root, PathBuf::from("/games/saved"));
        assert_eq!(source, RootSource::Saved);
    }

    #[test]
    fn empty_saved_root_falls_through() {
        let mut settings = UserSettings::default();
        settings.set_current_root(Some(PathBuf::new()));
        assert_eq!(settings.current_root(), None);
        assert_eq!(settings.resolve_root(None).1, RootSource::WorkingDir);
    }

    #[test]
    fn missing_file_is_empty_settings() {
        let tmp = TempDir::new().unwrap();
        let settings = UserSettings::load_from(&tmp.path().join("settings.toml")).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg").join("settings.toml");
        let mut settings = UserSettings::default();
        settings.set_current_root(Some(PathBuf::from("/games/wild")));
        settings.save_to(&path).unwrap();

        let loaded = UserSettings::load_from(&path).unwrap();
        assert_eq!(loaded.current_root(), Some(Path::new("/games/wild")));
        assert!(!tmp.path().join("cfg").join("settings.toml.tmp").exists());

        let mut cleared = loaded;
        cleared.set_current_root(None);
        cleared.save_to(&path).unwrap();
        assert_eq!(UserSettings::load_from(&path).unwrap().current_root(), None);
    }

    #[test]
    fn unknown_keys_survive_a_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[ui]\ntheme = \"dark\"\n\n[project]\npinned = true\n").unwrap();

        let mut settings = UserSettings::load_from(&path).unwrap();
        settings.set_current_root(Some(PathBuf::from("/games/wild")));
        settings.save_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("theme = \"dark\""));
        assert!(text.contains("pinned = true"));
        assert!(text.contains("current_root = \"/games/wild\""));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[project\n").unwrap();
        assert!(matches!(
            UserSettings::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
