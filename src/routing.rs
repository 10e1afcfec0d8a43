//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    AppState, Error, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        get_expenses_endpoint, get_summary_endpoint, update_expense_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSE_SUMMARY, get(get_summary_endpoint))
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
