use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    database_id::ExpenseId,
    expense::{CategoryName, ExpenseChanges, ExpenseTitle, update_expense},
};

/// The state needed to update an expense.
#[derive(Debug, Clone)]
pub struct UpdateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating an expense.
///
/// Missing or `null` fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateExpenseData {
    pub title: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<Date>,
}

impl TryFrom<UpdateExpenseData> for ExpenseChanges {
    type Error = Error;

    fn try_from(data: UpdateExpenseData) -> Result<Self, Self::Error> {
        Ok(Self {
            title: data
                .title
                .map(|title| ExpenseTitle::new(&title))
                .transpose()?,
            category: data
                .category
                .map(|category| CategoryName::new(&category))
                .transpose()?,
            amount: data.amount,
            date: data.date,
        })
    }
}

/// A route handler for updating some or all fields of an expense.
///
/// Responds with the updated expense, or 404 Not Found if the expense does not exist.
pub async fn update_expense_endpoint(
    State(state): State<UpdateExpenseState>,
    Path(expense_id): Path<ExpenseId>,
    Json(data): Json<UpdateExpenseData>,
) -> Result<Response, Error> {
    let changes = ExpenseChanges::try_from(data)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = update_expense(expense_id, changes, &connection)?;

    tracing::info!("Updated expense {expense_id}");

    Ok(Json(expense).into_response())
}
