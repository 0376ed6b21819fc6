use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;

use crate::error::ExpenseResult;

/// One persisted expense record.
///
/// Serde renames drive the CSV column headers, so the exported file reads
/// `ID,Date,Category,Amount,Description` without a hand-written header row.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Expense {
    #[serde(rename = "ID")]
    pub id: i64,

    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Amount", serialize_with = "two_decimals")]
    pub amount: f64,

    #[serde(rename = "Description")]
    pub description: String,
}

/// Amounts are written with exactly two fraction digits.
fn two_decimals<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{amount:.2}"))
}

/// Open the database file and make sure the schema exists.
pub fn open_database(path: &Path) -> ExpenseResult<Connection> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(conn)
}

/// Create the expenses table if absent. Idempotent.
pub fn setup_database(conn: &Connection) -> ExpenseResult<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

/// Insert one expense and return the id SQLite assigned to it.
pub fn insert_expense(
    conn: &Connection,
    date: &str,
    category: &str,
    amount: f64,
    description: &str,
) -> ExpenseResult<i64> {
    conn.execute(
        "INSERT INTO expenses (date, category, amount, description) VALUES (?1, ?2, ?3, ?4)",
        params![date, category, amount, description],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Delete an expense by id. Deleting an absent id is a no-op.
pub fn delete_expense(conn: &Connection, id: i64) -> ExpenseResult<()> {
    conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
    Ok(())
}

fn expense_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
    })
}

/// All expenses for the list view: newest date first, ties in insertion order.
pub fn list_expenses(conn: &Connection) -> ExpenseResult<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, category, amount, description
         FROM expenses
         ORDER BY date DESC, id ASC",
    )?;

    let expenses = stmt
        .query_map([], expense_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

/// Full-table scan in insertion order, used by the CSV exporter.
pub fn scan_expenses(conn: &Connection) -> ExpenseResult<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, category, amount, description
         FROM expenses
         ORDER BY id ASC",
    )?;

    let expenses = stmt
        .query_map([], expense_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

pub fn count_expenses(conn: &Connection) -> ExpenseResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_conn();
        setup_database(&conn).unwrap();
        assert_eq!(count_expenses(&conn).unwrap(), 0);
    }

    #[test]
    fn test_insert_assigns_fresh_ids() {
        let conn = test_conn();

        let a = insert_expense(&conn, "2024-03-01", "Food", 12.50, "Lunch").unwrap();
        let b = insert_expense(&conn, "2024-03-02", "Travel", 30.00, "Train").unwrap();

        assert!(b > a, "ids should increase with insertion order");
        assert_eq!(count_expenses(&conn).unwrap(), 2);
    }

    #[test]
    fn test_list_orders_by_date_desc_then_id() {
        let conn = test_conn();

        insert_expense(&conn, "2024-01-15", "Food", 8.00, "Breakfast").unwrap();
        insert_expense(&conn, "2024-03-01", "Food", 12.50, "Lunch").unwrap();
        let first_tie = insert_expense(&conn, "2024-02-10", "Books", 20.00, "Novel").unwrap();
        let second_tie = insert_expense(&conn, "2024-02-10", "Food", 5.25, "Coffee").unwrap();

        let expenses = list_expenses(&conn).unwrap();
        let dates: Vec<&str> = expenses.iter().map(|e| e.date.as_str()).collect();

        assert_eq!(
            dates,
            vec!["2024-03-01", "2024-02-10", "2024-02-10", "2024-01-15"]
        );
        // Same date: insertion order wins
        assert_eq!(expenses[1].id, first_tie);
        assert_eq!(expenses[2].id, second_tie);
    }

    #[test]
    fn test_scan_preserves_insertion_order() {
        let conn = test_conn();

        insert_expense(&conn, "2024-03-01", "Food", 12.50, "Lunch").unwrap();
        insert_expense(&conn, "2024-01-15", "Food", 8.00, "Breakfast").unwrap();

        let expenses = scan_expenses(&conn).unwrap();
        assert_eq!(expenses[0].date, "2024-03-01");
        assert_eq!(expenses[1].date, "2024-01-15");
    }

    #[test]
    fn test_delete_removes_exactly_one_row() {
        let conn = test_conn();

        let keep = insert_expense(&conn, "2024-03-01", "Food", 12.50, "Lunch").unwrap();
        let gone = insert_expense(&conn, "2024-03-02", "Travel", 30.00, "Train").unwrap();

        delete_expense(&conn, gone).unwrap();

        let expenses = list_expenses(&conn).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id, keep);
    }

    #[test]
    fn test_delete_absent_id_is_noop() {
        let conn = test_conn();

        insert_expense(&conn, "2024-03-01", "Food", 12.50, "Lunch").unwrap();
        delete_expense(&conn, 9999).unwrap();

        assert_eq!(count_expenses(&conn).unwrap(), 1);
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.db");

        {
            let conn = open_database(&path).unwrap();
            insert_expense(&conn, "2024-03-01", "Food", 12.50, "Lunch").unwrap();
        }

        let conn = open_database(&path).unwrap();
        let expenses = list_expenses(&conn).unwrap();

        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].date, "2024-03-01");
        assert_eq!(expenses[0].category, "Food");
        assert_eq!(expenses[0].amount, 12.50);
        assert_eq!(expenses[0].description, "Lunch");
    }
}
