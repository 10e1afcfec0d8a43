//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, pagination::PaginationConfig, timezone::get_local_offset};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Used to decide what "today" is when an expense is created without a date.
    pub local_timezone: String,

    /// The config that controls how to split the category summary into pages.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the expense table.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the timezone is not a known timezone or if the
    /// database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            db_connection: connection,
        })
    }
}
