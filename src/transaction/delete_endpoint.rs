//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_htmx::HxRedirect;

use crate::{
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    transaction::{core::delete_transaction, create_endpoint::CreateTransactionState},
};

/// A route handler for deleting a transaction owned by the current user.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> impl IntoResponse {
    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = delete_transaction(transaction_id, user_id, &connection) {
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

    use axum::{
        Extension,
        extract::{Path, State},
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::CategoryKind,
        db::initialize,
        transaction::{Transaction, core::create_transaction, count_transactions_for_user},
    };

    use super::{CreateTransactionState, delete_transaction_endpoint};

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
    async fn deletes_own_transaction() {
        let (state, user_id) = get_test_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Expense, 100.0, date!(2025 - 01 - 05)),
                user_id,
                &connection,
            )
            .unwrap()
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user_id), Path(transaction.id))
                .await
                .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions_for_user(user_id, &connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn cannot_delete_another_users_transaction() {
        let (state, user_id) = get_test_state();
        let (transaction, other_id) = {
            let connection = state.db_connection.lock().unwrap();
            let other = create_user(
                Email::new_unchecked("other@bar.baz"),
                PasswordHash::from_raw_password("anotherstrongpassword1", 4).unwrap(),
                &connection,
            )
            .unwrap();
            let transaction = create_transaction(
                Transaction::build(CategoryKind::Expense, 100.0, date!(2025 - 01 - 05)),
                other.id,
                &connection,
            )
            .unwrap();
            (transaction, other.id)
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user_id), Path(transaction.id))
                .await
                .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            count_transactions_for_user(other_id, &connection).unwrap(),
            1,
            "the other user's transaction should survive"
        );
    }

    #[tokio::test]
    async fn deleting_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_transaction_endpoint(State(state), Extension(user_id), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
