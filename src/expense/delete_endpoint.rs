use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::ExpenseId, expense::delete_expense};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an expense, responds with 204 No Content on success.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_expense(expense_id, &connection)?;

    tracing::info!("Deleted expense {expense_id}");

    Ok(StatusCode::NO_CONTENT)
}
