use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use asset_ledger_lib::Dashboard;

use super::report;
use crate::CliError;

/// Rename a media file into a new lifecycle state.
pub(crate) fn run_transition(
    dashboard: &Dashboard,
    path: &str,
    status: &str,
    json: bool,
) -> Result<bool, CliError> {
    report(dashboard.transition_media(path, status)?, json, |moved| {
        if moved.changed {
            log::info!(
                "{} {} -> {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                moved.old_path,
                moved.new_name.if_supports_color(Stdout, |t| t.bold()),
            );
        } else {
            log::info!(
                "{}",
                format!("{} already {}", moved.new_path, status)
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    })
}
