//! Expense tracker is a small web service for recording expenses.
//!
//! This library provides a JSON REST API for creating, listing, updating and
//! deleting expenses, and for summarising how much was spent per category.
//! Expenses are stored in a single SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod logging;
mod pagination;
mod routing;
mod timezone;

pub use app_state::AppState;
pub use database_id::ExpenseId;
pub use db::initialize as initialize_db;
pub use expense::{CategoryName, Expense, ExpenseTitle, NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An empty string was used for an expense title.
    #[error("Expense title cannot be empty")]
    EmptyTitle,

    /// An empty string was used for an expense category.
    #[error("Expense category cannot be empty")]
    EmptyCategory,

    /// No expenses matched the list query.
    #[error("No expenses found")]
    NoExpenses,

    /// There are no category totals on the requested summary page.
    #[error("No data available for summary")]
    EmptySummary,

    /// The page or page size for a paginated request was out of range.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A category total is too large to be represented as a finite number.
    #[error("the total for category \"{0}\" is out of range")]
    TotalOutOfRange(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                (StatusCode::NOT_FOUND, "Expense not found".to_owned())
            }
            Error::NoExpenses | Error::EmptySummary => (StatusCode::NOT_FOUND, self.to_string()),
            Error::EmptyTitle | Error::EmptyCategory | Error::InvalidPagination(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::DatabaseLockError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred, try again later".to_owned(),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details"
                        .to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
