pub(crate) mod config;
pub(crate) mod entities;
pub(crate) mod manifest;
pub(crate) mod media;
pub(crate) mod serve;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;
use serde_json::Value;

use asset_ledger_lib::{ApiResponse, Status};

use crate::CliError;

/// Print a response, as JSON or through `show`, and report whether the
/// request succeeded.
pub(crate) fn report<T: Serialize>(
    response: ApiResponse<T>,
    json: bool,
    show: impl FnOnce(&T),
) -> Result<bool, CliError> {
    if json {
        let text = serde_json::to_string_pretty(&response)
            .map_err(|e| CliError::runtime(format!("Failed to encode response: {}", e)))?;
        println!("{}", text);
        return Ok(response.is_success());
    }
    match &response {
        ApiResponse::Success(value) => {
            show(value);
            Ok(true)
        }
        ApiResponse::Failure(failure) => {
            log::error!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                failure.error
            );
            Ok(false)
        }
    }
}

/// Parse a command-line value as JSON, falling back to a plain string so
/// `set-field ... name Rex` works without quoting.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Split a `FIELD=VALUE` argument.
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, Value), CliError> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::usage(format!("expected FIELD=VALUE, got '{}'", raw)))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(CliError::usage(format!("missing field name in '{}'", raw)));
    }
    Ok((field.to_string(), parse_value(value)))
}

/// Status word colored by how far along the workflow it is.
pub(crate) fn styled_status(status: &str) -> String {
    let parsed = status.parse::<Status>().unwrap_or_default();
    match parsed {
        Status::Approved | Status::Clean => status
            .if_supports_color(Stdout, |t| t.green())
            .to_string(),
        Status::Declined => status.if_supports_color(Stdout, |t| t.red()).to_string(),
        Status::Final => status.if_supports_color(Stdout, |t| t.cyan()).to_string(),
        Status::Pending => status
            .if_supports_color(Stdout, |t| t.yellow())
            .to_string(),
    }
}
