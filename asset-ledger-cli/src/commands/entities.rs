use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde_json::Map;

use asset_ledger_lib::Dashboard;

use super::{parse_assignment, parse_value, report, styled_status};
use crate::CliError;
use crate::cli_types::EntityArgs;

const DESCRIPTION_WIDTH: usize = 60;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

/// List entity categories and their record counts.
pub(crate) fn run_categories(dashboard: &Dashboard, json: bool) -> Result<bool, CliError> {
    report(dashboard.categories()?, json, |response| {
        if response.categories.is_empty() {
            log::info!(
                "{}",
                format!("No entity categories under {}", dashboard.entities().root().display())
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
            return;
        }
        for summary in &response.categories {
            log::info!(
                "  {} {:>5}  {}",
                format!("{:<14}", summary.category.short_name())
                    .if_supports_color(Stdout, |t| t.bold()),
                summary.count,
                summary.name.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    })
}

/// Show every entity of a category with its merged status.
pub(crate) fn run_category(dashboard: &Dashboard, category: &str, json: bool) -> Result<bool, CliError> {
    report(dashboard.get_category(category)?, json, |view| {
        log::info!(
            "{} ({} entities)",
            view.category
                .display_name()
                .if_supports_color(Stdout, |t| t.bold()),
            view.entities.len(),
        );
        log::info!("");
        for entity in &view.entities {
            let description = entity.str_field("sourceDescription").unwrap_or_default();
            log::info!(
                "  {:<32} {} {}",
                entity.id(),
                styled_status(&format!("{:<10}", entity.str_field("status").unwrap_or("pending"))),
                truncate(description, DESCRIPTION_WIDTH).if_supports_color(Stdout, |t| t.dimmed()),
            );
            if let Some(note) = entity.str_field("declineNote") {
                log::info!("    note: {}", note);
            }
            if let Some(consumed) = entity.str_field("consumedStatus") {
                log::info!("    consumed: {}", styled_status(consumed));
            }
        }
        for skipped in &view.skipped {
            log::warn!(
                "  {} skipped {}: {}",
                "\u{26a0}".if_supports_color(Stdout, |t| t.yellow()),
                skipped.path.display(),
                skipped.reason,
            );
        }
    })
}

/// Set the primary or consumed status of an entity.
pub(crate) fn run_status(
    dashboard: &Dashboard,
    entity: &EntityArgs,
    status: &str,
    note: Option<&str>,
    consumed: bool,
    json: bool,
) -> Result<bool, CliError> {
    let response = if consumed {
        dashboard.set_consumed_status(&entity.category, &entity.file, &entity.id, status, note)?
    } else {
        dashboard.set_status(&entity.category, &entity.file, &entity.id, status, note)?
    };
    report(response, json, |ack| {
        log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            ack.message
        );
    })
}

pub(crate) fn run_set_field(
    dashboard: &Dashboard,
    entity: &EntityArgs,
    field: &str,
    value: &str,
    json: bool,
) -> Result<bool, CliError> {
    let response = dashboard.set_field(
        &entity.category,
        &entity.file,
        &entity.id,
        field,
        parse_value(value),
    )?;
    report(response, json, |ack| {
        log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            ack.message
        );
    })
}

pub(crate) fn run_update(
    dashboard: &Dashboard,
    entity: &EntityArgs,
    assignments: &[String],
    json: bool,
) -> Result<bool, CliError> {
    let mut updates = Map::new();
    for raw in assignments {
        let (field, value) = parse_assignment(raw)?;
        updates.insert(field, value);
    }
    let response = dashboard.update_entity(&entity.category, &entity.file, &entity.id, &updates)?;
    report(response, json, |ack| {
        log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            ack.message
        );
    })
}
