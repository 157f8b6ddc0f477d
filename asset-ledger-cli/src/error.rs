use asset_ledger_lib::{ConfigError, LedgerError};
use thiserror::Error;

/// Errors that end a CLI invocation with a non-zero exit code.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Project or settings configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or server error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Unexpected store failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Bad command-line input
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config(e.to_string())
    }
}
