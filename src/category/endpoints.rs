//! Endpoints for creating and deleting custom categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryKind, CategoryName, create_category, delete_category, get_category},
    database_id::CategoryId,
    endpoints,
    transaction::delete_transactions_with_category,
};

use super::DEFAULT_ICON;

/// The state needed to create or delete categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a custom category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    /// The display name of the category.
    pub name: String,
    /// The emoji to show next to the name. Falls back to a default when empty.
    #[serde(default)]
    pub icon: String,
    /// Whether the category is for expenses or income.
    pub kind: CategoryKind,
}

/// A route handler for creating a custom category, redirects to the
/// settings view on success.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryForm>,
) -> impl IntoResponse {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let icon = if form.icon.trim().is_empty() {
        DEFAULT_ICON
    } else {
        form.icon.trim()
    };

    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = create_category(name, icon, form.kind, user_id, &connection) {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Query parameters for category deletion.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteCategoryQuery {
    /// When set, all of the user's transactions referencing the category
    /// are deleted along with it. When skipped, those transactions are left
    /// orphaned and render via the raw-id fallback.
    #[serde(default)]
    pub cascade: bool,
}

/// A route handler for deleting a custom category, optionally cascading the
/// deletion to the transactions that reference it.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<DeleteCategoryQuery>,
) -> impl IntoResponse {
    let connection = state.db_connection.lock().unwrap();

    let category = match get_category(category_id, user_id, &connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Error::DeleteMissingCategory.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = delete_category(category_id, user_id, &connection) {
        return error.into_alert_response();
    }

    if query.cascade {
        let category_ref = category_id.to_string();
        match delete_transactions_with_category(&category_ref, user_id, &connection) {
            Ok(deleted) => {
                tracing::info!(
                    "Deleted category \"{}\" and {deleted} transactions referencing it",
                    category.name
                )
            }
            Err(error) => return error.into_alert_response(),
        }
    }

    (
        HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::{CategoryKind, CategoryName, create_category, get_categories_for_user},
        db::initialize,
        transaction::{Transaction, count_transactions_for_user, create_transaction},
    };

    use super::{
        CategoryForm, CategoryState, DeleteCategoryQuery, create_category_endpoint,
        delete_category_endpoint,
    };

    fn get_test_state() -> (CategoryState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::from_raw_password("averystrongtestpassword", 4).unwrap(),
            &conn,
        )
        .unwrap();

        (
            CategoryState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn creates_category_for_user() {
        let (state, user_id) = get_test_state();

        let response = create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(CategoryForm {
                name: "Momo".to_string(),
                icon: "🥟".to_string(),
                kind: CategoryKind::Expense,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories_for_user(user_id, &connection).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Momo");
        assert_eq!(categories[0].icon, "🥟");
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_any_write() {
        let (state, user_id) = get_test_state();

        let response = create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(CategoryForm {
                name: "   ".to_string(),
                icon: String::new(),
                kind: CategoryKind::Expense,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories_for_user(user_id, &connection).unwrap();
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn empty_icon_gets_default() {
        let (state, user_id) = get_test_state();

        create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(CategoryForm {
                name: "Tuition".to_string(),
                icon: String::new(),
                kind: CategoryKind::Expense,
            }),
        )
        .await
        .into_response();

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories_for_user(user_id, &connection).unwrap();
        assert_eq!(categories[0].icon, super::DEFAULT_ICON);
    }

    #[tokio::test]
    async fn delete_with_cascade_removes_referencing_transactions() {
        let (state, user_id) = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryName::new_unchecked("Momo"),
                "🥟",
                CategoryKind::Expense,
                user_id,
                &connection,
            )
            .unwrap();

            create_transaction(
                Transaction::build(CategoryKind::Expense, 100.0, date!(2025 - 01 - 05))
                    .category(&category.id.to_string(), "Momo"),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Expense, 50.0, date!(2025 - 01 - 06))
                    .category("food", "Food"),
                user_id,
                &connection,
            )
            .unwrap();

            category
        };

        let response = delete_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category.id),
            Query(DeleteCategoryQuery { cascade: true }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_categories_for_user(user_id, &connection).unwrap().is_empty());
        // Only the transaction referencing the deleted category is gone.
        assert_eq!(count_transactions_for_user(user_id, &connection).unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_without_cascade_leaves_transactions_orphaned() {
        let (state, user_id) = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryName::new_unchecked("Momo"),
                "🥟",
                CategoryKind::Expense,
                user_id,
                &connection,
            )
            .unwrap();

            create_transaction(
                Transaction::build(CategoryKind::Expense, 100.0, date!(2025 - 01 - 05))
                    .category(&category.id.to_string(), "Momo"),
                user_id,
                &connection,
            )
            .unwrap();

            category
        };

        delete_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category.id),
            Query(DeleteCategoryQuery { cascade: false }),
        )
        .await
        .into_response();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions_for_user(user_id, &connection).unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_missing_category_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_category_endpoint(
            State(state),
            Extension(user_id),
            Path(999),
            Query(DeleteCategoryQuery::default()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
