//! Record operations: the thin layer between raw form input and storage.
//!
//! `add_expense` owns the validation order the UI relies on: required
//! fields first, then format checks, then the insert. Nothing touches the
//! database until every check passes.

use rusqlite::Connection;

use crate::db;
use crate::error::{ExpenseError, ExpenseResult};
use crate::validate::{is_valid_amount, is_valid_date};

/// The four raw strings captured from the input form.
#[derive(Debug, Clone, Default)]
pub struct RawExpense {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: String,
}

fn required<'a>(value: &'a str, field: &'static str) -> ExpenseResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ExpenseError::MissingField { field });
    }
    Ok(trimmed)
}

/// Validate the raw form input and persist one new expense.
///
/// Returns the id assigned by storage. On any error no row is written.
pub fn add_expense(conn: &Connection, input: &RawExpense) -> ExpenseResult<i64> {
    let date = required(&input.date, "date")?;
    let category = required(&input.category, "category")?;
    let amount = required(&input.amount, "amount")?;
    let description = required(&input.description, "description")?;

    if !is_valid_date(date) {
        return Err(ExpenseError::InvalidDate);
    }
    if !is_valid_amount(amount) {
        return Err(ExpenseError::InvalidAmount);
    }

    // The amount pattern guarantees this parses
    let amount: f64 = amount.parse().map_err(|_| ExpenseError::InvalidAmount)?;

    let id = db::insert_expense(conn, date, category, amount, description)?;
    log::info!("added expense id={id} date={date} amount={amount:.2}");

    Ok(id)
}

/// Delete the expense with the given id.
pub fn delete_expense(conn: &Connection, id: i64) -> ExpenseResult<()> {
    db::delete_expense(conn, id)?;
    log::info!("deleted expense id={id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_expenses, list_expenses, setup_database};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn valid_input() -> RawExpense {
        RawExpense {
            date: "2024-03-01".into(),
            category: "Food".into(),
            amount: "12.50".into(),
            description: "Lunch".into(),
        }
    }

    #[test]
    fn test_add_persists_exact_values() {
        let conn = test_conn();

        let id = add_expense(&conn, &valid_input()).unwrap();

        let expenses = list_expenses(&conn).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id, id);
        assert_eq!(expenses[0].date, "2024-03-01");
        assert_eq!(expenses[0].category, "Food");
        assert_eq!(expenses[0].amount, 12.50);
        assert_eq!(expenses[0].description, "Lunch");
    }

    #[test]
    fn test_latest_date_lists_first() {
        let conn = test_conn();

        let mut earlier = valid_input();
        earlier.date = "2024-02-01".into();
        add_expense(&conn, &earlier).unwrap();
        let id = add_expense(&conn, &valid_input()).unwrap();

        assert_eq!(list_expenses(&conn).unwrap()[0].id, id);
    }

    #[test]
    fn test_empty_field_rejected_without_mutation() {
        let conn = test_conn();

        for field in ["date", "category", "amount", "description"] {
            let mut input = valid_input();
            match field {
                "date" => input.date.clear(),
                "category" => input.category = "   ".into(),
                "amount" => input.amount.clear(),
                _ => input.description.clear(),
            }

            let err = add_expense(&conn, &input).unwrap_err();
            assert!(
                matches!(err, ExpenseError::MissingField { field: f } if f == field),
                "expected MissingField for {field}, got {err}"
            );
        }

        assert_eq!(count_expenses(&conn).unwrap(), 0);
    }

    #[test]
    fn test_bad_date_rejected_without_mutation() {
        let conn = test_conn();

        let mut input = valid_input();
        input.date = "2024/03/01".into();

        assert!(matches!(
            add_expense(&conn, &input).unwrap_err(),
            ExpenseError::InvalidDate
        ));
        assert_eq!(count_expenses(&conn).unwrap(), 0);
    }

    #[test]
    fn test_bad_amount_rejected_without_mutation() {
        let conn = test_conn();

        for bad in ["12.555", "-5", "abc"] {
            let mut input = valid_input();
            input.amount = bad.into();

            assert!(matches!(
                add_expense(&conn, &input).unwrap_err(),
                ExpenseError::InvalidAmount
            ));
        }

        assert_eq!(count_expenses(&conn).unwrap(), 0);
    }

    #[test]
    fn test_text_fields_stored_trimmed() {
        let conn = test_conn();

        let mut input = valid_input();
        input.category = "  Food  ".into();
        input.description = " Lunch ".into();
        add_expense(&conn, &input).unwrap();

        let expenses = list_expenses(&conn).unwrap();
        assert_eq!(expenses[0].category, "Food");
        assert_eq!(expenses[0].description, "Lunch");
    }

    #[test]
    fn test_delete_then_gone_from_listing() {
        let conn = test_conn();

        let id = add_expense(&conn, &valid_input()).unwrap();
        delete_expense(&conn, id).unwrap();

        assert!(list_expenses(&conn).unwrap().is_empty());
    }
}
