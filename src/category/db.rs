//! Database operations for custom categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::CategoryId};

use super::domain::{CategoryKind, CategoryName};

/// A category created by a user, stored alongside the built-in set.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomCategory {
    /// The category's row id. Transactions reference it in decimal form.
    pub id: CategoryId,
    /// The display name.
    pub name: CategoryName,
    /// The emoji shown next to the name.
    pub icon: String,
    /// Whether the category is for expenses or income.
    pub kind: CategoryKind,
    /// The user that owns the category.
    pub user_id: UserID,
    /// When the category was created.
    pub created_at: OffsetDateTime,
    /// When the category was last changed.
    pub updated_at: OffsetDateTime,
}

/// Create the category table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            kind TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a custom category for `user_id` and return it with its generated ID.
pub fn create_category(
    name: CategoryName,
    icon: &str,
    kind: CategoryKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<CustomCategory, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO category (name, icon, kind, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            name.as_ref(),
            icon,
            kind.as_str(),
            user_id.as_i64(),
            now,
            now,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(CustomCategory {
        id,
        name,
        icon: icon.to_string(),
        kind,
        user_id,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a single custom category owned by `user_id`.
pub fn get_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<CustomCategory, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, kind, user_id, created_at, updated_at
             FROM category WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's custom categories, oldest first.
pub fn get_categories_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CustomCategory>, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, kind, user_id, created_at, updated_at
             FROM category WHERE user_id = :user_id ORDER BY created_at ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete a custom category owned by `user_id`.
///
/// Transactions referencing the category are left untouched; the caller
/// decides whether to cascade their deletion.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if the category doesn't exist or
/// belongs to another user.
pub fn delete_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

fn map_category_row(row: &Row) -> Result<CustomCategory, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let icon = row.get(2)?;
    let raw_kind: String = row.get(3)?;
    let user_id: i64 = row.get(4)?;
    let created_at = row.get(5)?;
    let updated_at = row.get(6)?;

    // Stored kinds are written through CategoryKind::as_str, so anything
    // else is treated as an expense rather than failing the whole query.
    let kind = match raw_kind.as_str() {
        "income" => CategoryKind::Income,
        _ => CategoryKind::Expense,
    };

    Ok(CustomCategory {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        icon,
        kind,
        user_id: UserID::new(user_id),
        created_at,
        updated_at,
    })
}
