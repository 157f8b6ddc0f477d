use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use asset_ledger_lib::Dashboard;

use super::report;
use crate::CliError;

/// Regenerate the AssetLoader module.
pub(crate) fn run_manifest_build(dashboard: &Dashboard, json: bool) -> Result<bool, CliError> {
    report(dashboard.rebuild_manifest()?, json, |built| {
        let state = if built.changed { "written" } else { "unchanged" };
        log::info!(
            "{} {} ({}): {} images, {} audio",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            built.output.if_supports_color(Stdout, |t| t.cyan()),
            state,
            built.images,
            built.audio,
        );
    })
}

/// Show how the runtime would resolve one asset id.
pub(crate) fn run_manifest_resolve(dashboard: &Dashboard, id: &str, json: bool) -> Result<bool, CliError> {
    report(dashboard.resolve_asset(id)?, json, |resolved| {
        if resolved.placeholder {
            log::info!(
                "{} -> {} {}",
                resolved.id,
                resolved.path,
                "(placeholder)".if_supports_color(Stdout, |t| t.yellow()),
            );
        } else {
            log::info!("{} -> {}", resolved.id, resolved.path);
        }
    })
}
