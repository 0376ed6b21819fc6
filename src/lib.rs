// Expense Ledger - Core Library
// Storage, validation, record operations and CSV export; the terminal UI
// lives behind the `tui` feature.

pub mod db;
pub mod error;
pub mod export;
pub mod ops;
pub mod validate;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use db::{
    count_expenses, delete_expense, insert_expense, list_expenses, open_database, scan_expenses,
    setup_database, Expense,
};
pub use error::{ExpenseError, ExpenseResult};
pub use export::{export_to_path, write_csv};
pub use ops::{add_expense, RawExpense};
pub use validate::{is_valid_amount, is_valid_date};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
