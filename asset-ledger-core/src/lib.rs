//! Shared vocabulary for the asset ledger: content categories, approval
//! statuses, and the error taxonomy used by every store and operation.

pub mod category;
pub mod error;
pub mod status;
pub mod util;

pub use category::{Category, CategoryParseError};
pub use error::LedgerError;
pub use status::{Status, StatusParseError};
