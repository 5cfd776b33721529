//! On-demand export of the current user's transactions as CSV or JSON.
//!
//! The serialization is pure and synchronous. Exporting an empty
//! transaction list is rejected with a "nothing to export" alert instead of
//! producing an empty file.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{Transaction, get_transactions_for_user},
};

/// The formats transactions can be exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// A pretty-printed JSON array of transaction objects.
    Json,
}

impl ExportFormat {
    fn file_extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
}

/// Serialize transactions as CSV with a header row.
///
/// # Errors
/// Returns [Error::ExportSerializationError] if the CSV writer fails.
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Date", "Type", "Category", "Amount", "Description"])
        .map_err(|error| Error::ExportSerializationError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string(),
                transaction.kind.to_string(),
                transaction.category_name.clone(),
                transaction.amount.to_string(),
                transaction.description.clone(),
            ])
            .map_err(|error| Error::ExportSerializationError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::ExportSerializationError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::ExportSerializationError(error.to_string()))
}

/// Serialize transactions as a pretty-printed JSON array.
///
/// # Errors
/// Returns [Error::ExportSerializationError] if serialization fails.
pub fn transactions_to_json(transactions: &[Transaction]) -> Result<String, Error> {
    let items: Vec<_> = transactions
        .iter()
        .map(|transaction| {
            json!({
                "date": transaction.date.to_string(),
                "category": transaction.category_name,
                "type": transaction.kind.to_string(),
                "amount": transaction.amount,
                "description": transaction.description,
                "createdAt": transaction.created_at.to_string(),
                "updatedAt": transaction.updated_at.to_string(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&items)
        .map_err(|error| Error::ExportSerializationError(error.to_string()))
}

/// Query parameters for the export endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// The format to export in. Defaults to CSV.
    #[serde(default)]
    pub format: ExportFormat,
}

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that serializes the current user's transactions and
/// offers them as a file download.
///
/// When the user has no transactions, no file is produced and a "nothing to
/// export" alert is returned instead.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_export(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let transactions = {
        let connection = state.db_connection.lock().unwrap();

        match get_transactions_for_user(user_id, &connection) {
            Ok(transactions) => transactions,
            Err(error) => return error.into_alert_response(),
        }
    };

    if transactions.is_empty() {
        return Error::NothingToExport.into_alert_response();
    }

    let content = match query.format {
        ExportFormat::Csv => transactions_to_csv(&transactions),
        ExportFormat::Json => transactions_to_json(&transactions),
    };

    let content = match content {
        Ok(content) => content,
        Err(error) => {
            tracing::error!("could not serialize export: {error}");
            return error.into_alert_response();
        }
    };

    let filename = format!(
        "kharcha-{}.{}",
        OffsetDateTime::now_utc().date(),
        query.format.file_extension()
    );

    (
        [
            (CONTENT_TYPE, query.format.mime_type().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        content,
    )
        .into_response()
}


#[cfg(test)]
mod endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::{
            StatusCode,
            header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        },
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::CategoryKind,
        db::initialize,
        transaction::{Transaction, create_transaction},
    };

    use super::{ExportFormat, ExportQuery, ExportState, get_export};

    fn get_test_state() -> (ExportState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::from_raw_password("averystrongtestpassword", 4).unwrap(),
            &conn,
        )
        .unwrap();

        (
            ExportState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn exports_csv_as_attachment() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Expense, 500.0, date!(2025 - 01 - 05))
                    .category("food", "Food"),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_export(
            State(state),
            Extension(user_id),
            Query(ExportQuery {
                format: ExportFormat::Csv,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/csv");

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"kharcha-"));
        assert!(disposition.ends_with(".csv\""));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("Date,Type,Category,Amount,Description"));
    }

    #[tokio::test]
    async fn exports_json_with_mime_type() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Income, 2000.0, date!(2025 - 01 - 10))
                    .category("salary", "Salary"),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_export(
            State(state),
            Extension(user_id),
            Query(ExportQuery {
                format: ExportFormat::Json,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn empty_export_is_rejected_with_notice_and_no_file() {
        let (state, user_id) = get_test_state();

        let response = get_export(
            State(state),
            Extension(user_id),
            Query(ExportQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            response.headers().get(CONTENT_DISPOSITION).is_none(),
            "no file should be offered when there is nothing to export"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Nothing to export"));
    }
}
