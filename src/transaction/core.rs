//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    category::CategoryKind,
    database_id::TransactionId,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether the transaction is an expense or income.
    pub kind: CategoryKind,
    /// The amount of money spent or earned, always non-negative.
    pub amount: f64,
    /// The id of the category the transaction belongs to: a built-in slug
    /// or the decimal row id of a custom category.
    pub category_id: String,
    /// A snapshot of the category's display name at write time.
    pub category_name: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, as a Gregorian date.
    pub date: Date,
    /// When the record was created.
    pub created_at: OffsetDateTime,
    /// When the record was last overwritten.
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: CategoryKind, amount: f64, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            date,
            category_id: "other".to_string(),
            category_name: "Other Expense".to_string(),
            description: String::new(),
        }
    }
}

/// The user-editable fields of a [Transaction].
///
/// Used both when creating a transaction and when overwriting one during an
/// edit. Amount validation (strictly positive) happens at the endpoints
/// before a builder is constructed.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the transaction is an expense or income.
    pub kind: CategoryKind,
    /// The monetary amount of the transaction, always non-negative.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The category id, a built-in slug or a custom category row id.
    pub category_id: String,
    /// The resolved category name stored alongside the id.
    pub category_name: String,
    /// A human-readable description of the transaction.
    pub description: String,
}

impl TransactionBuilder {
    /// Set the category id and name snapshot for the transaction.
    pub fn category(mut self, category_id: &str, category_name: &str) -> Self {
        self.category_id = category_id.to_string();
        self.category_name = category_name.to_string();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction owned by `user_id` from a builder.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
             (user_id, kind, amount, category_id, category_name, description, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, user_id, kind, amount, category_id, category_name, description, date, created_at, updated_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.kind.as_str(),
                builder.amount,
                &builder.category_id,
                &builder.category_name,
                &builder.description,
                builder.date,
                now,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, kind, amount, category_id, category_name, description, date, created_at, updated_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all of a user's transactions, newest date first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, amount, category_id, category_name, description, date, created_at, updated_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, created_at DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the user-editable fields of a transaction and refresh its
/// `updated_at` timestamp.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if the transaction doesn't exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET kind = ?1, amount = ?2, category_id = ?3, category_name = ?4,
             description = ?5, date = ?6, updated_at = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            builder.kind.as_str(),
            builder.amount,
            &builder.category_id,
            &builder.category_name,
            &builder.description,
            builder.date,
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the transaction doesn't exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Delete all of a user's transactions that reference `category_id`.
///
/// Used by the category delete endpoint to cascade deletion and avoid
/// orphaned references. Returns the number of transactions deleted.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_transactions_with_category(
    category_id: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE category_id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )
        .map_err(|error| error.into())
}

/// Get the total number of transactions the user has.
///
/// # Errors
/// This function will return an [Error::SqlError] there is some SQL error.
pub fn count_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            amount REAL NOT NULL,
            category_id TEXT NOT NULL,
            category_name TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let raw_kind: String = row.get(2)?;
    let amount = row.get(3)?;
    let category_id = row.get(4)?;
    let category_name = row.get(5)?;
    let description = row.get(6)?;
    let date = row.get(7)?;
    let created_at = row.get(8)?;
    let updated_at = row.get(9)?;

    // Stored kinds are written through CategoryKind::as_str, so anything
    // else is treated as an expense rather than failing the whole query.
    let kind = match raw_kind.as_str() {
        "income" => CategoryKind::Income,
        _ => CategoryKind::Expense,
    };

    Ok(Transaction {
        id,
        user_id: UserID::new(user_id),
        kind,
        amount,
        category_id,
        category_name,
        description,
        date,
        created_at,
        updated_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
