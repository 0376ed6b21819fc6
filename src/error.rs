//! Error types for expense-ledger.
//!
//! Every user-facing failure is one variant here; the UI reports it and
//! stays usable. Only a storage failure during startup is fatal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExpenseError {
    /// A required form field was left empty
    #[error("All fields are required: {field} is empty")]
    MissingField { field: &'static str },

    /// Date field does not match YYYY-MM-DD
    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate,

    /// Amount field is not a non-negative decimal with up to two places
    #[error("Amount must be a non-negative number with at most two decimals")]
    InvalidAmount,

    /// Delete requested while no row is selected
    #[error("Select an entry to delete")]
    NoSelection,

    /// Underlying persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// CSV export could not be written
    #[error("Export failed: {0}")]
    ExportIo(String),
}

impl ExpenseError {
    /// True for the input-shaped errors a user can fix by retyping.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidDate | Self::InvalidAmount
        )
    }
}

impl From<std::io::Error> for ExpenseError {
    fn from(err: std::io::Error) -> Self {
        Self::ExportIo(err.to_string())
    }
}

impl From<csv::Error> for ExpenseError {
    fn from(err: csv::Error) -> Self {
        Self::ExportIo(err.to_string())
    }
}

/// Result type alias for expense-ledger operations
pub type ExpenseResult<T> = Result<T, ExpenseError>;
