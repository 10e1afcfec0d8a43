//! Per-category expense totals.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    expense::CategoryName,
    pagination::{Page, PageQuery, PaginationConfig},
};

/// The total amount spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category the expenses were grouped by.
    pub category: CategoryName,
    /// The sum of the amounts of all expenses in the category.
    pub total_amount: f64,
}

/// Sum the expense amounts per category, one page at a time.
///
/// Categories are ordered by name so that consecutive pages neither skip nor
/// repeat a category.
///
/// # Errors
/// This function will return a:
/// - [Error::TotalOutOfRange] if a category's total overflows to infinity,
/// - [Error::SqlError] if there is some SQL error.
pub fn summarize_by_category(
    page: Page,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) AS total_amount
             FROM expense
             GROUP BY category
             ORDER BY category ASC
             LIMIT :limit OFFSET :offset",
        )?
        .query_map(
            &[(":limit", &page.limit()), (":offset", &page.offset())],
            map_row,
        )?
        .map(|maybe_total| -> Result<CategoryTotal, Error> {
            let total = maybe_total?;

            if total.total_amount.is_finite() {
                Ok(total)
            } else {
                tracing::error!(
                    "total for category {} is not finite: {}",
                    total.category,
                    total.total_amount
                );
                Err(Error::TotalOutOfRange(total.category.to_string()))
            }
        })
        .collect()
}

fn map_row(row: &Row) -> Result<CategoryTotal, rusqlite::Error> {
    let raw_category: String = row.get(0)?;
    let total_amount = row.get(1)?;

    Ok(CategoryTotal {
        category: CategoryName::new_unchecked(&raw_category),
        total_amount,
    })
}

/// The state needed for the expense summary.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The default page and page size.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for the total amount spent per category.
///
/// Responds with 404 Not Found if the requested page has no categories, and
/// 422 Unprocessable Entity if `page` or `limit` is zero.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, Error> {
    let page = Page::from_query(&query, &state.pagination_config)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let totals = summarize_by_category(page, &connection)?;

    if totals.is_empty() {
        return Err(Error::EmptySummary);
    }

    Ok(Json(totals).into_response())
}
