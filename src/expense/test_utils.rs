#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, PaginationConfig, build_router,
    expense::{CategoryName, Expense, ExpenseTitle, create_expense},
};

pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(connection, "Etc/UTC", PaginationConfig::default())
        .expect("Could not create app state.")
}

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

pub(crate) fn insert_expense(
    state: &AppState,
    title: &str,
    category: &str,
    amount: f64,
    date: Date,
) -> Expense {
    let connection = state.db_connection.lock().unwrap();

    create_expense(
        Expense::build(
            ExpenseTitle::new_unchecked(title),
            CategoryName::new_unchecked(category),
            amount,
            date,
        ),
        &connection,
    )
    .expect("Could not create expense")
}
