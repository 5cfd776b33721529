//! Database schema initialization.

use rusqlite::Connection;

use crate::{
    auth::create_user_table, category::create_category_table,
    transaction::create_transaction_table,
};

/// Create the tables for the application's domain models.
///
/// This function is idempotent, tables that already exist are left untouched.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute("PRAGMA foreign_keys = ON;", ())?;

    create_user_table(connection)?;
    create_category_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
