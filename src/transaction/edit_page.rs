//! The page with the form for editing an existing transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::UserID,
    category::get_categories_for_user,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        core::get_transaction,
        create_endpoint::CreateTransactionState,
        form::{FormMethod, TransactionFormValues, transaction_form},
    },
};

/// Display the page for editing a transaction owned by the current user.
pub async fn get_edit_transaction_page(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let custom_categories = get_categories_for_user(user_id, &connection)?;

    let values = TransactionFormValues {
        kind: transaction.kind,
        amount: Some(transaction.amount),
        date: transaction.date,
        category_id: transaction.category_id.clone(),
        description: transaction.description.clone(),
    };

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let form = transaction_form(
        FormMethod::Put,
        &format_endpoint(endpoints::PUT_TRANSACTION, transaction.id),
        "Save changes",
        &values,
        &custom_categories,
    );

    let content = maud::html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Edit Transaction" }

            (form)
        }
    );

    Ok(base("Edit Transaction", &[], &content).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user},
        category::CategoryKind,
        db::initialize,
        transaction::{Transaction, core::create_transaction},
    };

    use super::{CreateTransactionState, get_edit_transaction_page};

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
    async fn page_prefills_transaction_fields() {
        let (state, user_id) = get_test_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Expense, 500.0, date!(2025 - 01 - 05))
                    .category("food", "Food")
                    .description("momo plate"),
                user_id,
                &connection,
            )
            .unwrap()
        };

        let response = get_edit_transaction_page(State(state), Extension(user_id), Path(transaction.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = Html::parse_document(&String::from_utf8_lossy(&body));

        let amount_selector = Selector::parse("input[name=amount]").unwrap();
        let amount = html.select(&amount_selector).next().unwrap();
        assert_eq!(amount.value().attr("value"), Some("500"));

        let description_selector = Selector::parse("input[name=description]").unwrap();
        let description = html.select(&description_selector).next().unwrap();
        assert_eq!(description.value().attr("value"), Some("momo plate"));
    }

    #[tokio::test]
    async fn missing_transaction_renders_not_found() {
        let (state, user_id) = get_test_state();

        let result = get_edit_transaction_page(State(state), Extension(user_id), Path(999)).await;

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                assert_eq!(error, Error::NotFound);
                error.into_response()
            }
        };

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
