use thiserror::Error;

/// Errors raised by the entity store, registry overlay, and the operations
/// layered on top of them.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A record, file, or category does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record file exists but could not be decoded
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// A rename target already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request itself is invalid (missing note, bad field path, illegal transition)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Underlying filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl LedgerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Anticipated misuse or missing data, as opposed to a failing disk.
    ///
    /// The API layer turns expected errors into `{success: false}` results
    /// and lets everything else propagate.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}
