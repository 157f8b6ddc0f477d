//! Media file lifecycle, encoded in file names.
//!
//! Media files live at `<media-root>/<category>/<stem>[_<state>]_<role>.<ext>`:
//!
//! | name                              | role      | state    |
//! |-----------------------------------|-----------|----------|
//! | `enemy_rat_original.png`          | raw       | pending  |
//! | `enemy_rat_approved_original.png` | raw       | approved |
//! | `enemy_rat_declined_original.png` | raw       | declined |
//! | `enemy_rat_final_original.png`    | raw       | final    |
//! | `enemy_rat_clean.png`             | processed | pending  |
//!
//! Only raw files move through the lifecycle; a processed file is always
//! pending. A transition strips whatever state token the name carries,
//! keeps the role token, and renames the file to carry the new state. The rename is a
//! single `fs::rename`, so a concurrent reader sees either the old or the
//! new name.

use std::fs;
use std::path::{Component, Path};

use asset_ledger_core::util::to_slash;
use asset_ledger_core::{LedgerError, Status};
use serde::Serialize;

/// Which variant of the art a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRole {
    /// Generated output, before background removal (`_original`)
    Raw,
    /// Post-processed output (`_clean`), or a name without a role token
    Processed,
}

impl MediaRole {
    fn token(&self) -> &'static str {
        match self {
            Self::Raw => "original",
            Self::Processed => "clean",
        }
    }

    /// Whether files of this role carry a state token.
    pub fn carries_state(&self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// Lifecycle state carried by a media file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaState {
    Pending,
    Approved,
    Declined,
    Final,
}

impl MediaState {
    /// Token rendered into the file name; pending carries none.
    fn token(&self) -> Option<&'static str> {
        match self {
            Self::Pending => None,
            Self::Approved => Some("approved"),
            Self::Declined => Some("declined"),
            Self::Final => Some("final"),
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "declined" => Some(Self::Declined),
            "final" => Some(Self::Final),
            _ => None,
        }
    }

    /// Media state for a requested status. `clean` describes a registry
    /// record (a processed variant exists), not a file state.
    pub fn from_status(status: Status) -> Result<Self, LedgerError> {
        match status {
            Status::Pending => Ok(Self::Pending),
            Status::Approved => Ok(Self::Approved),
            Status::Declined => Ok(Self::Declined),
            Status::Final => Ok(Self::Final),
            Status::Clean => Err(LedgerError::validation(
                "'clean' is not a media file state; use pending, approved, declined or final",
            )),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Pending => Status::Pending,
            Self::Approved => Status::Approved,
            Self::Declined => Status::Declined,
            Self::Final => Status::Final,
        }
    }
}

/// Check that `from -> to` is an edge of the media state machine.
///
/// ```text
/// pending  -> approved | declined
/// approved -> final
/// declined -> pending
/// ```
///
/// Re-applying the current state is always allowed and is a no-op.
pub fn check_transition(from: MediaState, to: MediaState) -> Result<(), LedgerError> {
    use MediaState::*;
    let allowed = from == to
        || matches!(
            (from, to),
            (Pending, Approved) | (Pending, Declined) | (Approved, Final) | (Declined, Pending)
        );
    if allowed {
        Ok(())
    } else {
        Err(LedgerError::validation(format!(
            "cannot move media from {} to {}",
            from.status(),
            to.status()
        )))
    }
}

/// A media file name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaName {
    pub stem: String,
    pub role: MediaRole,
    /// Whether the name carried a role token at all
    role_token: bool,
    pub state: MediaState,
    pub extension: Option<String>,
}

impl MediaName {
    pub fn parse(file_name: &str) -> Self {
        let (body, extension) = match file_name.rsplit_once('.') {
            Some((body, ext)) if !body.is_empty() => (body, Some(ext.to_string())),
            _ => (file_name, None),
        };

        let (mut body, role, role_token) = if let Some(rest) = body.strip_suffix("_original") {
            (rest, MediaRole::Raw, true)
        } else if let Some(rest) = body.strip_suffix("_clean") {
            (rest, MediaRole::Processed, true)
        } else {
            (body, MediaRole::Processed, false)
        };

        // The token nearest the role marker is the effective state; any
        // further stacked tokens are leftovers and get collapsed.
        let mut state = None;
        while let Some((rest, token)) = body.rsplit_once('_') {
            let Some(parsed) = MediaState::from_token(token) else {
                break;
            };
            if rest.is_empty() {
                break;
            }
            state.get_or_insert(parsed);
            body = rest;
        }

        Self {
            stem: body.to_string(),
            role,
            role_token,
            state: state.unwrap_or(MediaState::Pending),
            extension,
        }
    }

    pub fn with_state(&self, state: MediaState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        let mut name = self.stem.clone();
        if let Some(token) = self.state.token() {
            name.push('_');
            name.push_str(token);
        }
        if self.role_token {
            name.push('_');
            name.push_str(self.role.token());
        }
        if let Some(ext) = &self.extension {
            name.push('.');
            name.push_str(ext);
        }
        name
    }
}

/// Outcome of a media transition. Paths are relative to the media root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub old_path: String,
    pub new_path: String,
    pub new_name: String,
    pub state: MediaState,
    /// False when the file already carried the requested state
    pub changed: bool,
}

/// Move the media file at `relative_path` (relative to `media_root`) to
/// `target`, renaming it in place.
///
/// Fails with `NotFound` if the file is missing and `Conflict` if the new
/// name is taken. An illegal transition, a non-pending target for a
/// processed file, or a path that leaves the media root is `Validation`.
pub fn transition_media(
    media_root: &Path,
    relative_path: &str,
    target: Status,
) -> Result<Transition, LedgerError> {
    let relative = Path::new(relative_path.trim());
    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(LedgerError::validation(format!(
            "invalid media path '{}'",
            relative_path
        )));
    }

    let source = media_root.join(relative);
    if !source.is_file() {
        return Err(LedgerError::not_found(format!(
            "File not found: {}",
            relative_path
        )));
    }

    let file_name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = MediaName::parse(&file_name);
    let to = MediaState::from_status(target)?;
    if !name.role.carries_state() && to != MediaState::Pending {
        return Err(LedgerError::validation(format!(
            "processed media cannot be {}: {}",
            to.status(),
            relative_path
        )));
    }
    check_transition(name.state, to)?;

    let new_name = name.with_state(to).file_name();
    let target_path = source.with_file_name(&new_name);
    let old_path = to_slash(relative);
    let new_path = pathdiff::diff_paths(&target_path, media_root)
        .map(|p| to_slash(&p))
        .unwrap_or_else(|| new_name.clone());

    if new_name == file_name {
        log::debug!("{} is already {}", old_path, to.status());
        return Ok(Transition {
            old_path,
            new_path,
            new_name,
            state: to,
            changed: false,
        });
    }

    if target_path.exists() {
        return Err(LedgerError::conflict(format!(
            "Target already exists: {}",
            new_path
        )));
    }

    fs::rename(&source, &target_path)
        .map_err(|e| LedgerError::io(source.display().to_string(), e))?;
    log::info!("Media: {} -> {}", old_path, new_name);

    Ok(Transition {
        old_path,
        new_path,
        new_name,
        state: to,
        changed: true,
    })
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
