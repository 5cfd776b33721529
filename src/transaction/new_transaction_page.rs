//! The page with the form for creating a new transaction.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryKind, get_categories_for_user},
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        create_endpoint::CreateTransactionState,
        form::{FormMethod, TransactionFormValues, transaction_form},
    },
};

/// Display the page for creating a new transaction.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let custom_categories = get_categories_for_user(user_id, &connection)?;

    let values = TransactionFormValues {
        kind: CategoryKind::Expense,
        amount: None,
        date: OffsetDateTime::now_utc().date(),
        category_id: "food".to_string(),
        description: String::new(),
    };

    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = transaction_form(
        FormMethod::Post,
        endpoints::TRANSACTIONS_API,
        "Add transaction",
        &values,
        &custom_categories,
    );

    let content = maud::html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Add Transaction" }

            (form)
        }
    );

    Ok(base("New Transaction", &[], &content).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        endpoints,
    };

    use super::{CreateTransactionState, get_new_transaction_page};

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
    async fn page_shows_form_with_builtin_and_custom_categories() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryName::new_unchecked("Momo"),
                "🥟",
                CategoryKind::Expense,
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_new_transaction_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = Html::parse_document(&String::from_utf8_lossy(&body));

        let form_selector = Selector::parse("form").unwrap();
        let form = html.select(&form_selector).next().expect("expected a form");
        assert_eq!(
            form.value().attr("hx-post"),
            Some(endpoints::TRANSACTIONS_API)
        );

        let option_selector = Selector::parse("option").unwrap();
        let option_text: Vec<String> = form
            .select(&option_selector)
            .map(|option| option.text().collect::<String>())
            .collect();

        assert!(
            option_text.iter().any(|text| text.contains("Food")),
            "built-in categories should be listed, got {option_text:?}"
        );
        assert!(
            option_text.iter().any(|text| text.contains("Momo")),
            "custom categories should be listed, got {option_text:?}"
        );
    }
}
