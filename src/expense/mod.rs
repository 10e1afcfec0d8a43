//! Expense management for the expense tracker.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the validated `ExpenseTitle` and `CategoryName` types
//! - Database functions for storing, querying, updating and deleting expenses
//! - The per-category summary
//! - Route handlers for the expense endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod summary;

pub use self::core::{
    CategoryName, Expense, ExpenseChanges, ExpenseQuery, ExpenseTitle, NewExpense, SortOrder,
    create_expense, create_expense_table, delete_expense, get_expense, query_expenses,
    update_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::update_expense_endpoint;
pub use get_endpoint::get_expense_endpoint;
pub use list_endpoint::get_expenses_endpoint;
pub use summary::get_summary_endpoint;

#[cfg(test)]
pub(crate) mod test_utils;
