use serde::{Deserialize, Serialize};

/// Approval lifecycle stage of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Declined,
    /// Post-processed variant (background removed) exists
    Clean,
    Final,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Clean => "clean",
            Self::Final => "final",
        }
    }

    /// Content in this state is compiled into the runtime manifest.
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Clean | Self::Approved)
    }

    /// Only declined content carries a decline note.
    pub fn requires_note(&self) -> bool {
        matches!(self, Self::Declined)
    }

    pub fn all() -> &'static [Status] {
        &[
            Self::Pending,
            Self::Approved,
            Self::Declined,
            Self::Clean,
            Self::Final,
        ]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known status.
#[derive(Debug, Clone)]
pub struct StatusParseError(pub String);

impl std::fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown status: '{}' (expected pending, approved, declined, clean or final)",
            self.0
        )
    }
}

impl std::error::Error for StatusParseError {}

impl std::str::FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Status::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == lower)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}
