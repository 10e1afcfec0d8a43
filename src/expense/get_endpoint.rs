use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::ExpenseId, expense::get_expense};

/// The state needed to get an expense.
#[derive(Debug, Clone)]
pub struct GetExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for getting an expense by its database ID.
///
/// This function will return the status code 404 if the requested resource does not exist.
pub async fn get_expense_endpoint(
    State(state): State<GetExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, &connection)?;

    Ok(Json(expense).into_response())
}
