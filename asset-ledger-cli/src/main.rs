//! asset-ledger CLI
//!
//! Command-line interface to the game content ledger: review entity
//! records, move art through the approval workflow, and publish the
//! runtime asset manifest.

mod cli_types;
mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use asset_ledger_lib::{Dashboard, Project};
use asset_ledger_lib::settings::{UserSettings, settings_path};

use cli_types::{Cli, Commands, ConfigAction, ManifestAction};
use commands::config::{run_config_clear_root, run_config_path, run_config_set_root, run_config_show};
use commands::entities::{run_categories, run_category, run_set_field, run_status, run_update};
use commands::manifest::{run_manifest_build, run_manifest_resolve};
use commands::media::run_transition;
use commands::serve::run_serve;
pub(crate) use error::CliError;

/// Install the logger. Normal output goes through `log::info!` with a bare
/// message format; `--verbose` adds timestamps and levels. `RUST_LOG`
/// overrides the level chosen by the flags.
fn init_logging(quiet: bool, verbose: bool, json: bool) {
    let level = if quiet || json {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    // JSON responses own stdout
    builder.target(if json {
        env_logger::Target::Stderr
    } else {
        env_logger::Target::Stdout
    });
    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

fn open_dashboard(root: Option<PathBuf>) -> Result<Dashboard, CliError> {
    let (root, source) = UserSettings::load_or_default().resolve_root(root);
    let project = Project::load(&root)?;
    log::debug!("Project root: {} ({})", project.root().display(), source.describe());
    Ok(Dashboard::new(project))
}

/// Run the selected command. `Ok(false)` means the request itself was
/// rejected (a `{success: false}` response).
fn run(cli: Cli) -> Result<bool, CliError> {
    let json = cli.json;
    match cli.command {
        Commands::Categories => run_categories(&open_dashboard(cli.root)?, json),
        Commands::Category { category } => run_category(&open_dashboard(cli.root)?, &category, json),
        Commands::Status {
            entity,
            status,
            note,
        } => run_status(&open_dashboard(cli.root)?, &entity, &status, note.as_deref(), false, json),
        Commands::ConsumedStatus {
            entity,
            status,
            note,
        } => run_status(&open_dashboard(cli.root)?, &entity, &status, note.as_deref(), true, json),
        Commands::SetField {
            entity,
            field,
            value,
        } => run_set_field(&open_dashboard(cli.root)?, &entity, &field, &value, json),
        Commands::Update { entity, updates } => {
            run_update(&open_dashboard(cli.root)?, &entity, &updates, json)
        }
        Commands::Transition { path, status } => {
            run_transition(&open_dashboard(cli.root)?, &path, &status, json)
        }
        Commands::Manifest { action } => {
            let dashboard = open_dashboard(cli.root)?;
            match action {
                ManifestAction::Build => run_manifest_build(&dashboard, json),
                ManifestAction::Resolve { id } => run_manifest_resolve(&dashboard, &id, json),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(cli.root, json),
            ConfigAction::Path => run_config_path(json),
            ConfigAction::SetRoot { dir } => run_config_set_root(&settings_path(), &dir),
            ConfigAction::ClearRoot => run_config_clear_root(&settings_path()),
        },
        Commands::Serve { bind } => run_serve(open_dashboard(cli.root)?, bind),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose, cli.json);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
            ExitCode::from(2)
        }
    }
}
