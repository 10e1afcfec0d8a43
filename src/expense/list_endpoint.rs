use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    expense::{CategoryName, ExpenseQuery, SortOrder, query_expenses},
};

/// The state needed to list expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ListExpensesParams {
    /// Only list expenses in this category. Blank means all categories.
    pub category: Option<String>,
    /// "amount" or "date", anything else lists expenses in creation order.
    pub sort: Option<String>,
}

impl From<ListExpensesParams> for ExpenseQuery {
    fn from(params: ListExpensesParams) -> Self {
        Self {
            category: params
                .category
                .and_then(|category| CategoryName::new(&category).ok()),
            sort: params.sort.and_then(|sort| SortOrder::from_query(&sort)),
        }
    }
}

/// A route handler for listing expenses, optionally filtered by category and sorted.
///
/// Responds with 404 Not Found if no expenses match.
pub async fn get_expenses_endpoint(
    State(state): State<ListExpensesState>,
    Query(params): Query<ListExpensesParams>,
) -> Result<Response, Error> {
    let query = ExpenseQuery::from(params);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = query_expenses(&query, &connection)?;

    if expenses.is_empty() {
        return Err(Error::NoExpenses);
    }

    Ok(Json(expenses).into_response())
}
