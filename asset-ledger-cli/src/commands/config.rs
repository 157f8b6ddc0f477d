use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use asset_ledger_lib::Project;
use asset_ledger_lib::settings::{UserSettings, settings_path};

use crate::CliError;

fn show_dir(label: &str, path: &Path) {
    let state = if path.is_dir() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found)".if_supports_color(Stdout, |t| t.dimmed()).to_string()
    };
    log::info!(
        "  {:<16} {} {}",
        label,
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        state,
    );
}

/// Show the resolved project root and every directory the ledger uses.
pub(crate) fn run_config_show(root: Option<PathBuf>, json: bool) -> Result<bool, CliError> {
    let settings = UserSettings::load_or_default();
    let (root, source) = settings.resolve_root(root);
    let project = Project::load(root)?;

    if json {
        let text = serde_json::to_string_pretty(project.config())
            .map_err(|e| CliError::runtime(format!("Failed to encode config: {}", e)))?;
        println!("{}", text);
        return Ok(true);
    }

    log::info!(
        "{}",
        "Asset Ledger Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    log::info!(
        "  {:<16} {} {}",
        "Project root:",
        project.root().display().if_supports_color(Stdout, |t| t.cyan()),
        format!("(from {})", source.describe()).if_supports_color(Stdout, |t| t.dimmed()),
    );
    match settings.current_root() {
        Some(p) => log::info!("  {:<16} {}", "Saved root:", p.display()),
        None => log::info!(
            "  {:<16} {}",
            "Saved root:",
            "(none)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
    let config_path = project.config_path();
    if config_path.is_file() {
        log::info!("  {:<16} {}", "Config file:", config_path.display());
    } else {
        log::info!(
            "  {:<16} {}",
            "Config file:",
            "(defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");
    show_dir("Entities:", &project.entities_dir());
    show_dir("Registry:", &project.registry_dir());
    show_dir("Assets:", &project.asset_dir());
    show_dir("Media:", &project.media_dir());
    log::info!(
        "  {:<16} {}",
        "Manifest:",
        project.manifest_output().display(),
    );
    log::info!("  {:<16} {}", "Server bind:", project.config().server.bind);
    Ok(true)
}

fn path_document(path: &Path) -> String {
    serde_json::json!({ "path": path.display().to_string() }).to_string()
}

/// Print the user settings file path. Under `--json` the logger is
/// quieted, so the path goes straight to stdout.
pub(crate) fn run_config_path(json: bool) -> Result<bool, CliError> {
    let path = settings_path();
    if json {
        println!("{}", path_document(&path));
    } else {
        log::info!("{}", path.display());
    }
    Ok(true)
}

/// Save `dir` (canonicalized) as the project root in the settings file at
/// `settings`, keeping every other setting.
pub(crate) fn save_root(settings: &Path, dir: &Path) -> Result<PathBuf, CliError> {
    let dir = dir.canonicalize()?;
    if !dir.is_dir() {
        return Err(CliError::config(format!("{} is not a directory", dir.display())));
    }
    let mut user = UserSettings::load_from(settings)?;
    user.set_current_root(Some(dir.clone()));
    user.save_to(settings)?;
    Ok(dir)
}

pub(crate) fn run_config_set_root(settings: &Path, dir: &Path) -> Result<bool, CliError> {
    let dir = save_root(settings, dir)?;
    log::info!(
        "{} Project root set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        dir.display(),
    );
    Ok(true)
}

pub(crate) fn run_config_clear_root(settings: &Path) -> Result<bool, CliError> {
    let mut user = UserSettings::load_from(settings)?;
    user.set_current_root(None);
    user.save_to(settings)?;
    log::info!(
        "{} Saved project root cleared",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_root_stores_canonical_dir() {
        let tmp = TempDir::new().unwrap();
        let game = tmp.path().join("game");
        std::fs::create_dir(&game).unwrap();
        let settings = tmp.path().join("cfg/settings.toml");

        let saved = save_root(&settings, &game.join(".")).unwrap();
        assert_eq!(saved, game.canonicalize().unwrap());
        let user = UserSettings::load_from(&settings).unwrap();
        assert_eq!(user.current_root(), Some(saved.as_path()));

        assert!(run_config_clear_root(&settings).unwrap());
        assert_eq!(UserSettings::load_from(&settings).unwrap().current_root(), None);
    }

    #[test]
    fn json_path_is_a_document() {
        let doc: serde_json::Value =
            serde_json::from_str(&path_document(Path::new("/cfg/asset-ledger/settings.toml")))
                .unwrap();
        assert_eq!(doc["path"], "/cfg/asset-ledger/settings.toml");
        assert!(run_config_path(true).unwrap());
    }

    #[test]
    fn missing_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.toml");
        let err = save_root(&settings, &tmp.path().join("nowhere")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        assert!(!settings.exists());
    }

    #[test]
    fn file_is_not_a_root() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("notes.txt");
        std::fs::write(&file, "x").unwrap();
        let err = save_root(&tmp.path().join("settings.toml"), &file).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
