use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    expense::{CategoryName, Expense, ExpenseTitle, create_expense},
    timezone::get_local_date,
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating an expense.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateExpenseData {
    pub title: String,
    pub category: String,
    pub amount: f64,
    /// Defaults to today in the server's local timezone.
    pub date: Option<Date>,
}

/// A route handler for creating a new expense.
///
/// Responds with 201 Created, the new expense and its URI in the `Location` header.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Json(data): Json<CreateExpenseData>,
) -> Result<Response, Error> {
    let title = ExpenseTitle::new(&data.title)?;
    let category = CategoryName::new(&data.category)?;

    let date = match data.date {
        Some(date) => date,
        None => get_local_date(&state.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = create_expense(
        Expense::build(title, category, data.amount, date),
        &connection,
    )?;

    tracing::info!(
        "Created expense {} \"{}\" in \"{}\"",
        expense.id,
        expense.title,
        expense.category
    );

    let location = format_endpoint(endpoints::EXPENSE, expense.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(expense)).into_response())
}
