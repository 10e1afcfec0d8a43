/*! This module initializes the application's database. */

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, expense::create_expense_table};

/// Create the tables and indexes for the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table or index cannot be created or if there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
