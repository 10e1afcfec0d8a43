//! Defines the core data models and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, ToSql};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::ExpenseId};

// ============================================================================
// MODELS
// ============================================================================

/// A validated, non-empty expense title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ExpenseTitle(String);

impl ExpenseTitle {
    /// Create an expense title.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTitle] if `title` is empty or just whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyTitle)
        } else {
            Ok(Self(title.to_owned()))
        }
    }

    /// Create an expense title without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_owned())
    }
}

impl AsRef<str> for ExpenseTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ExpenseTitle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseTitle::new(s)
    }
}

impl Display for ExpenseTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, non-empty category name, e.g. "Food" or "Transport".
///
/// Category names are compared exactly, so "Food" and "food" are different categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is empty or just whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money that was spent on something.
///
/// To create a new `Expense`, use [Expense::build] and [create_expense].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// A short description of what the money was spent on.
    pub title: ExpenseTitle,
    /// The label used to group expenses in the summary.
    pub category: CategoryName,
    /// The amount of money spent. Negative amounts, e.g. refunds, are allowed.
    pub amount: f64,
    /// When the money was spent.
    pub date: Date,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [NewExpense] for discoverability.
    pub fn build(
        title: ExpenseTitle,
        category: CategoryName,
        amount: f64,
        date: Date,
    ) -> NewExpense {
        NewExpense {
            title,
            category,
            amount,
            date,
        }
    }
}

/// An expense that has not been saved to the database yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What the money was spent on.
    pub title: ExpenseTitle,
    /// The category of the expense, e.g. "Food", "Transport", "Rent".
    pub category: CategoryName,
    /// The amount of money spent.
    pub amount: f64,
    /// When the money was spent.
    ///
    /// Request handlers default this to today's date in the server's local timezone.
    pub date: Date,
}

/// A partial update to an expense.
///
/// Fields set to `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    /// The new title.
    pub title: Option<ExpenseTitle>,
    /// The new category.
    pub category: Option<CategoryName>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new date.
    pub date: Option<Date>,
}

/// The column used to order a list of expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest amount first.
    Amount,
    /// Oldest date first.
    Date,
}

impl SortOrder {
    /// Parse the `sort` query parameter.
    ///
    /// Returns `None` for anything other than "amount" or "date", in which case
    /// expenses are listed in the order they were created.
    pub fn from_query(sort: &str) -> Option<Self> {
        match sort {
            "amount" => Some(Self::Amount),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    fn order_by_clause(sort: Option<Self>) -> &'static str {
        match sort {
            Some(Self::Amount) => "ORDER BY amount ASC, id ASC",
            Some(Self::Date) => "ORDER BY date ASC, id ASC",
            None => "ORDER BY id ASC",
        }
    }
}

/// Selects which expenses to list and in what order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseQuery {
    /// Only include expenses whose category exactly matches this name.
    pub category: Option<CategoryName>,
    /// The ordering of the results, or creation order if `None`.
    pub sort: Option<SortOrder>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const EXPENSE_COLUMNS: &str = "id, title, category, amount, date";

/// Create a new expense in the database.
///
/// Identical expenses may be created any number of times, each gets its own ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "INSERT INTO expense (title, category, amount, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                new_expense.title.as_ref(),
                new_expense.category.as_ref(),
                new_expense.amount,
                new_expense.date,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve the expenses that match `query`.
///
/// An empty list is not an error here, the caller decides how to report it.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn query_expenses(
    query: &ExpenseQuery,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let mut sql = format!("SELECT {EXPENSE_COLUMNS} FROM expense");
    let mut params: Vec<(&str, &dyn ToSql)> = Vec::new();

    let category: Option<&str> = query.category.as_ref().map(|category| category.as_ref());
    if let Some(category) = &category {
        sql.push_str(" WHERE category = :category");
        params.push((":category", category as &dyn ToSql));
    }

    sql.push(' ');
    sql.push_str(SortOrder::order_by_clause(query.sort));

    connection
        .prepare(&sql)?
        .query_map(params.as_slice(), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Apply `changes` to the expense with `id` and return the updated expense.
///
/// The update is a single statement, so a missing expense leaves the table untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    changes: ExpenseChanges,
    connection: &Connection,
) -> Result<Expense, Error> {
    let title: Option<&str> = changes.title.as_ref().map(|title| title.as_ref());
    let category: Option<&str> = changes.category.as_ref().map(|category| category.as_ref());

    connection
        .prepare(&format!(
            "UPDATE expense SET
                title = COALESCE(?1, title),
                category = COALESCE(?2, category),
                amount = COALESCE(?3, amount),
                date = COALESCE(?4, date)
             WHERE id = ?5
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                title,
                category,
                changes.amount,
                changes.date,
                id,
            ),
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
            error => error.into(),
        })
}

/// Delete the expense with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_title ON expense(title);
        CREATE INDEX IF NOT EXISTS idx_expense_category ON expense(category);
        CREATE INDEX IF NOT EXISTS idx_expense_amount ON expense(amount);",
    )?;

    Ok(())
}

/// Map a database row to an Expense.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_title: String = row.get(1)?;
    let raw_category: String = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;

    Ok(Expense {
        id,
        title: ExpenseTitle::new_unchecked(&raw_title),
        category: CategoryName::new_unchecked(&raw_category),
        amount,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use std::collections::HashSet;

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        expense::{
            CategoryName, Expense, ExpenseChanges, ExpenseQuery, ExpenseTitle, SortOrder,
            create_expense, delete_expense, get_expense, query_expenses, update_expense,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert(
        title: &str,
        category: &str,
        amount: f64,
        date: time::Date,
        conn: &Connection,
    ) -> Expense {
        create_expense(
            Expense::build(
                ExpenseTitle::new_unchecked(title),
                CategoryName::new_unchecked(category),
                amount,
                date,
            ),
            conn,
        )
        .expect("Could not create expense")
    }

    fn count_expenses(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(id) FROM expense", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let expense = insert("Lunch", "Food", 12.5, date!(2025 - 10 - 05), &conn);

        assert!(expense.id > 0);
        assert_eq!(expense.title.as_ref(), "Lunch");
        assert_eq!(expense.category.as_ref(), "Food");
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.date, date!(2025 - 10 - 05));
    }

    #[test]
    fn create_allows_negative_amounts() {
        let conn = get_test_connection();

        let expense = insert("Refund", "Food", -3.0, date!(2025 - 10 - 05), &conn);

        assert_eq!(expense.amount, -3.0);
    }

    #[test]
    fn identical_expenses_get_unique_ids() {
        let conn = get_test_connection();
        let want_count = 20;

        let ids: HashSet<_> = (0..want_count)
            .map(|_| insert("Coffee", "Food", 4.5, date!(2025 - 10 - 05), &conn).id)
            .collect();

        assert_eq!(ids.len(), want_count);
        assert_eq!(count_expenses(&conn), want_count as i64);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = get_test_connection();
        let first = insert("Coffee", "Food", 4.5, date!(2025 - 10 - 05), &conn);
        delete_expense(first.id, &conn).unwrap();

        let second = insert("Coffee", "Food", 4.5, date!(2025 - 10 - 05), &conn);

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn get_returns_created_expense() {
        let conn = get_test_connection();
        let want = insert("Bus", "Transport", 2.2, date!(2025 - 10 - 05), &conn);

        let got = get_expense(want.id, &conn);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_expense(9999, &conn), Err(Error::NotFound));
    }

    #[test]
    fn query_filters_by_exact_category() {
        let conn = get_test_connection();
        let food = insert("Lunch", "Food", 12.5, date!(2025 - 10 - 05), &conn);
        insert("Bus", "Transport", 2.2, date!(2025 - 10 - 05), &conn);
        insert("Snack", "food", 1.0, date!(2025 - 10 - 05), &conn);

        let got = query_expenses(
            &ExpenseQuery {
                category: Some(CategoryName::new_unchecked("Food")),
                sort: None,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![food]);
    }

    #[test]
    fn query_without_sort_uses_creation_order() {
        let conn = get_test_connection();
        let want = vec![
            insert("C", "Food", 3.0, date!(2025 - 10 - 03), &conn),
            insert("A", "Food", 1.0, date!(2025 - 10 - 01), &conn),
            insert("B", "Food", 2.0, date!(2025 - 10 - 02), &conn),
        ];

        let got = query_expenses(&ExpenseQuery::default(), &conn).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn query_sorts_by_amount() {
        let conn = get_test_connection();
        let large = insert("Rent", "Housing", 500.0, date!(2025 - 10 - 01), &conn);
        let small = insert("Coffee", "Food", 4.5, date!(2025 - 10 - 03), &conn);
        let negative = insert("Refund", "Food", -10.0, date!(2025 - 10 - 02), &conn);

        let got = query_expenses(
            &ExpenseQuery {
                category: None,
                sort: Some(SortOrder::Amount),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![negative, small, large]);
    }

    #[test]
    fn query_sorts_by_date() {
        let conn = get_test_connection();
        let newest = insert("Rent", "Housing", 500.0, date!(2025 - 12 - 01), &conn);
        let oldest = insert("Coffee", "Food", 4.5, date!(2024 - 01 - 31), &conn);
        let middle = insert("Refund", "Food", -10.0, date!(2025 - 02 - 10), &conn);

        let got = query_expenses(
            &ExpenseQuery {
                category: None,
                sort: Some(SortOrder::Date),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![oldest, middle, newest]);
    }

    #[test]
    fn equal_amounts_keep_creation_order() {
        let conn = get_test_connection();
        let first = insert("Coffee", "Food", 4.5, date!(2025 - 10 - 09), &conn);
        let cheaper = insert("Gum", "Food", 1.0, date!(2025 - 10 - 01), &conn);
        let second = insert("Tea", "Food", 4.5, date!(2025 - 10 - 02), &conn);

        let got = query_expenses(
            &ExpenseQuery {
                category: None,
                sort: Some(SortOrder::Amount),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![cheaper, first, second]);
    }

    #[test]
    fn equal_dates_keep_creation_order() {
        let conn = get_test_connection();
        let first = insert("Rent", "Housing", 500.0, date!(2025 - 10 - 05), &conn);
        let older = insert("Bus", "Transport", 2.2, date!(2025 - 10 - 01), &conn);
        let second = insert("Coffee", "Food", 4.5, date!(2025 - 10 - 05), &conn);

        let got = query_expenses(
            &ExpenseQuery {
                category: None,
                sort: Some(SortOrder::Date),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![older, first, second]);
    }

    #[test]
    fn query_returns_empty_list_when_nothing_matches() {
        let conn = get_test_connection();
        insert("Bus", "Transport", 2.2, date!(2025 - 10 - 05), &conn);

        let got = query_expenses(
            &ExpenseQuery {
                category: Some(CategoryName::new_unchecked("Food")),
                sort: Some(SortOrder::Amount),
            },
            &conn,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn unknown_sort_is_ignored() {
        assert_eq!(SortOrder::from_query("title"), None);
        assert_eq!(SortOrder::from_query("Amount"), None);
        assert_eq!(SortOrder::from_query("amount"), Some(SortOrder::Amount));
        assert_eq!(SortOrder::from_query("date"), Some(SortOrder::Date));
    }

    #[test]
    fn update_only_amount_keeps_other_fields() {
        let conn = get_test_connection();
        let expense = insert("Lunch", "Food", 12.5, date!(2025 - 10 - 05), &conn);

        let updated = update_expense(
            expense.id,
            ExpenseChanges {
                amount: Some(20.0),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(
            updated,
            Expense {
                amount: 20.0,
                ..expense
            }
        );
    }

    #[test]
    fn update_applies_all_fields() {
        let conn = get_test_connection();
        let expense = insert("Lunch", "Food", 12.5, date!(2025 - 10 - 05), &conn);
        let changes = ExpenseChanges {
            title: Some(ExpenseTitle::new_unchecked("Train")),
            category: Some(CategoryName::new_unchecked("Transport")),
            amount: Some(7.0),
            date: Some(date!(2024 - 02 - 29)),
        };

        let updated = update_expense(expense.id, changes, &conn).unwrap();

        assert_eq!(
            updated,
            Expense {
                id: expense.id,
                title: ExpenseTitle::new_unchecked("Train"),
                category: CategoryName::new_unchecked("Transport"),
                amount: 7.0,
                date: date!(2024 - 02 - 29),
            }
        );
        assert_eq!(get_expense(expense.id, &conn), Ok(updated));
    }

    #[test]
    fn update_fails_on_missing_id() {
        let conn = get_test_connection();
        let expense = insert("Lunch", "Food", 12.5, date!(2025 - 10 - 05), &conn);

        let result = update_expense(
            9999,
            ExpenseChanges {
                amount: Some(1.0),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
        assert_eq!(count_expenses(&conn), 1);
        assert_eq!(get_expense(expense.id, &conn), Ok(expense));
    }

    #[test]
    fn delete_removes_expense() {
        let conn = get_test_connection();
        let expense = insert("Lunch", "Food", 12.5, date!(2025 - 10 - 05), &conn);

        delete_expense(expense.id, &conn).unwrap();

        assert_eq!(get_expense(expense.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(delete_expense(42, &conn), Err(Error::DeleteMissingExpense));
    }
}
