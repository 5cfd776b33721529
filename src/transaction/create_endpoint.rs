//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryKind, get_categories_for_user},
    endpoints,
    transaction::{Transaction, core::create_transaction, form::validate_category_for_kind},
};

/// The state needed to get or create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is an expense or income.
    pub kind: CategoryKind,
    /// The value of the transaction in rupees.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The id of the selected category.
    pub category_id: String,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// Validation failures (non-positive amount, category that doesn't exist or
/// has the wrong kind) are rendered as alert fragments and never reach the
/// database.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> impl IntoResponse {
    if form.amount <= 0.0 {
        return Error::NonPositiveAmount(form.amount).into_alert_response();
    }

    let connection = state.db_connection.lock().unwrap();

    let custom_categories = match get_categories_for_user(user_id, &connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_alert_response(),
    };

    let category_name =
        match validate_category_for_kind(&form.category_id, form.kind, &custom_categories) {
            Ok(name) => name,
            Err(error) => return error.into_alert_response(),
        };

    let transaction = Transaction::build(form.kind, form.amount, form.date)
        .category(&form.category_id, &category_name)
        .description(&form.description);

    if let Err(error) = create_transaction(transaction, user_id, &connection) {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, body::Body, extract::State, http::Response, response::IntoResponse};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::CategoryKind,
        db::initialize,
        transaction::{count_transactions_for_user, get_transactions_for_user},
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint};

    fn get_test_state() -> (CreateTransactionState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::from_raw_password("averystrongtestpassword", 4).unwrap(),
            &conn,
        )
        .unwrap();

        (
            CreateTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            kind: CategoryKind::Expense,
            amount: 500.0,
            date: date!(2025 - 01 - 05),
            category_id: "food".to_string(),
            description: "momo plate".to_string(),
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                .await
                .into_response();

        assert_redirects_to_transactions_view(response);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions_for_user(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 500.0);
        assert_eq!(transactions[0].category_name, "Food");
        assert_eq!(transactions[0].description, "momo plate");
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            kind: CategoryKind::Expense,
            amount: 0.0,
            date: date!(2025 - 01 - 05),
            category_id: "food".to_string(),
            description: String::new(),
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions_for_user(user_id, &connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_category_of_wrong_kind() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            kind: CategoryKind::Income,
            amount: 100.0,
            date: date!(2025 - 01 - 05),
            // "food" is an expense category.
            category_id: "food".to_string(),
            description: String::new(),
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions_for_user(user_id, &connection).unwrap(), 0);
    }

    #[test]
    fn form_decodes_from_urlencoded() {
        let form: TransactionForm = serde_html_form::from_str(
            "kind=expense&amount=500&date=2025-01-05&category_id=food&description=momo+plate",
        )
        .unwrap();

        assert_eq!(form.kind, CategoryKind::Expense);
        assert_eq!(form.amount, 500.0);
        assert_eq!(form.date, date!(2025 - 01 - 05));
        assert_eq!(form.category_id, "food");
        assert_eq!(form.description, "momo plate");
    }

    #[test]
    fn form_decodes_without_description() {
        let form: TransactionForm = serde_html_form::from_str(
            "kind=income&amount=2000&date=2025-01-10&category_id=salary",
        )
        .unwrap();

        assert_eq!(form.kind, CategoryKind::Income);
        assert_eq!(form.description, "");
    }

    #[track_caller]
    fn assert_redirects_to_transactions_view(response: Response<Body>) {
        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(
            location, "/transactions",
            "got redirect to {location:?}, want redirect to /transactions"
        );
    }
}
