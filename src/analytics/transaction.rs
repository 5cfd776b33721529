//! Database queries for retrieving the transaction view used by analytics.
//!
//! This is separate from the main Transaction domain model because the
//! aggregation only needs the kind, amount, category and date. The date is
//! read back as raw text and parsed leniently: a record whose stored date
//! does not parse gets `date: None` and is excluded from every aggregate
//! instead of failing the whole query.

use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, auth::UserID, category::CategoryKind};

/// A simplified transaction view for analytics aggregations.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionView {
    /// Whether the amount counts as income or expense.
    pub kind: CategoryKind,
    /// The stored amount. Negative values are clamped to zero when summing.
    pub amount: f64,
    /// The stored category id, resolved to a display name at render time.
    pub category_id: String,
    /// The transaction date, or `None` when the stored text did not parse.
    pub date: Option<Date>,
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Gets all of a user's transactions as analytics views.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails. Individual rows with
/// malformed dates are returned with `date: None` rather than erroring.
pub fn get_transaction_views(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionView>, Error> {
    connection
        .prepare(
            "SELECT kind, amount, category_id, date FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY date DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            let raw_kind: String = row.get(0)?;
            let amount = row.get(1)?;
            let category_id = row.get(2)?;
            let raw_date: String = row.get(3)?;

            let kind = match raw_kind.as_str() {
                "income" => CategoryKind::Income,
                _ => CategoryKind::Expense,
            };

            Ok(TransactionView {
                kind,
                amount,
                category_id,
                date: Date::parse(&raw_date, DATE_FORMAT).ok(),
            })
        })?
        .map(|maybe_view| maybe_view.map_err(|error| error.into()))
        .collect()
}
