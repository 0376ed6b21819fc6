//! CSV export of the full expenses table.

use rusqlite::Connection;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::db;
use crate::error::ExpenseResult;

const HEADER: [&str; 5] = ["ID", "Date", "Category", "Amount", "Description"];

/// Write every expense as CSV to `writer`.
///
/// Rows come out in insertion order under a
/// `ID,Date,Category,Amount,Description` header. The header is written
/// up front so an empty table still exports a well-formed file; the row
/// field order matches it through the serde renames on `Expense`.
/// Returns the data row count.
pub fn write_csv<W: Write>(conn: &Connection, writer: W) -> ExpenseResult<usize> {
    let expenses = db::scan_expenses(conn)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for expense in &expenses {
        wtr.serialize(expense)?;
    }
    wtr.flush()?;

    Ok(expenses.len())
}

/// Export to a file path. Failures to create or write the file surface as
/// `ExpenseError::ExportIo`; the database is never touched beyond the read.
pub fn export_to_path(conn: &Connection, path: &Path) -> ExpenseResult<usize> {
    let file = File::create(path)?;
    let count = write_csv(conn, file)?;
    log::info!("exported {count} expenses to {}", path.display());
    Ok(count)
}
