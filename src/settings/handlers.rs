//! The settings page and its endpoints.
//!
//! The sensitive operations (changing the password, deleting the account)
//! re-verify the current password before touching anything, so a stolen
//! session cookie alone is not enough to take over or destroy an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::alert_success,
    auth::{
        PasswordHash, User, UserID, ValidatedPassword, delete_user, get_user_by_id,
        invalidate_auth_cookie, update_user_password,
    },
    category::{CategoryKind, CustomCategory, get_categories_for_user},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        link, password_input,
    },
    navigation::NavBar,
};

/// The state needed for the settings page and its endpoints.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SettingsState> for Key {
    fn from_ref(state: &SettingsState) -> Self {
        state.cookie_key.clone()
    }
}

/// Display the settings page for the current user.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let custom_categories = get_categories_for_user(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW);

    Ok(settings_view(nav_bar, &user, &custom_categories).into_response())
}

fn card(title: &str, description: &str, body: Markup) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
        {
            h3 class="text-xl font-semibold" { (title) }
            p class="text-sm text-gray-500 dark:text-gray-400 mb-4" { (description) }

            (body)
        }
    )
}

fn account_card(user: &User) -> Markup {
    card(
        "Account Information",
        "Your account details",
        html!(
            div class="space-y-2"
            {
                div
                {
                    span class=(FORM_LABEL_STYLE) { "Email" }
                    p { (user.email) }
                }

                div
                {
                    span class=(FORM_LABEL_STYLE) { "Account Created" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        (user.created_at.date())
                    }
                }
            }
        ),
    )
}

fn security_card() -> Markup {
    card(
        "Security",
        "Manage your account security settings",
        html!(
            form
                hx-post=(endpoints::CHANGE_PASSWORD)
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                (password_input("current_password", "Current Password", 0, None))
                (password_input("new_password", "New Password", 0, None))
                (password_input("confirm_password", "Confirm New Password", 0, None))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Change Password" }
            }
        ),
    )
}

fn categories_card(custom_categories: &[CustomCategory]) -> Markup {
    card(
        "Custom Categories",
        "Manage your custom expense and income categories",
        html!(
            form
                hx-post=(endpoints::POST_CATEGORY)
                hx-target-error="#alert-container"
                class="flex gap-2 mb-4"
            {
                input
                    type="text"
                    name="icon"
                    placeholder="Icon"
                    class={(FORM_TEXT_INPUT_STYLE) " max-w-20"};

                input
                    type="text"
                    name="name"
                    placeholder="Category name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                select name="kind" class={(FORM_TEXT_INPUT_STYLE) " max-w-32"}
                {
                    option value=(CategoryKind::Expense.as_str()) { "Expense" }
                    option value=(CategoryKind::Income.as_str()) { "Income" }
                }

                button type="submit" class="px-4 py-2 bg-blue-500 dark:bg-blue-600 text-white rounded"
                {
                    "Add"
                }
            }

            @if custom_categories.is_empty() {
                p class="text-xs text-gray-500 dark:text-gray-400" { "No custom categories yet" }
            } @else {
                div class="space-y-2 overflow-auto max-h-[200px]"
                {
                    @for category in custom_categories {
                        (category_row(category))
                    }
                }
            }
        ),
    )
}

fn category_row(category: &CustomCategory) -> Markup {
    let border_style = if category.kind == CategoryKind::Income {
        "bg-green-50 border-green-300 dark:bg-green-900/20 dark:border-green-800"
    } else {
        "bg-red-50 border-red-300 dark:bg-red-900/20 dark:border-red-800"
    };
    let kind_label = if category.kind == CategoryKind::Income {
        "Income"
    } else {
        "Expense"
    };
    let delete_endpoint = format!(
        "{}?cascade=true",
        format_endpoint(endpoints::DELETE_CATEGORY, category.id)
    );

    html!(
        div class={"flex items-center justify-between p-2 border rounded " (border_style)}
        {
            div class="flex items-center gap-2"
            {
                span class="text-sm font-bold" { (category.icon) }
                span class="text-sm font-medium" { (category.name) }
                span class="text-xs text-gray-500 dark:text-gray-400" { (kind_label) }
            }

            button
                hx-delete=(delete_endpoint)
                hx-confirm="Remove this category and all the transactions associated with it?"
                hx-target-error="#alert-container"
                class=(BUTTON_DELETE_STYLE)
            {
                "Remove"
            }
        }
    )
}

fn data_card() -> Markup {
    card(
        "Data Management",
        "Manage your financial data",
        html!(
            div class="flex gap-2 mb-4"
            {
                a
                    href={(endpoints::EXPORT) "?format=csv"}
                    class="px-4 py-2 text-sm border border-gray-300 dark:border-gray-600 rounded
                        hover:bg-gray-100 dark:hover:bg-gray-700"
                {
                    "Export CSV"
                }

                a
                    href={(endpoints::EXPORT) "?format=json"}
                    class="px-4 py-2 text-sm border border-gray-300 dark:border-gray-600 rounded
                        hover:bg-gray-100 dark:hover:bg-gray-700"
                {
                    "Export JSON"
                }
            }

            hr class="mb-4 border-gray-200 dark:border-gray-700";

            span class={(FORM_LABEL_STYLE) " text-red-600 dark:text-red-500"} { "Danger Zone" }
            p class="text-sm text-gray-500 dark:text-gray-400 mb-2"
            {
                "Permanently delete your account and all data"
            }

            form
                hx-post=(endpoints::DELETE_ACCOUNT)
                hx-confirm="Are you sure you want to delete your account? This action cannot be undone and will permanently delete all your data."
                hx-target-error="#alert-container"
                class="space-y-2"
            {
                (password_input("password", "Confirm with your password", 0, None))

                button
                    type="submit"
                    class="px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded"
                {
                    "Delete Account"
                }
            }
        ),
    )
}

fn settings_view(nav_bar: NavBar, user: &User, custom_categories: &[CustomCategory]) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-8 mx-auto max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="mb-6"
            {
                h1 class="text-3xl font-bold" { "Settings" }
                p class="text-gray-500 dark:text-gray-400" { "Manage your account and other settings." }
            }

            div class="grid gap-6 md:grid-cols-2"
            {
                (account_card(user))
                (security_card())
                (data_card())
                (categories_card(custom_categories))
            }

            p class="mt-6" { (link(endpoints::LOG_OUT, "Sign Out")) }
        }
    );

    base("Settings", &[], &content)
}

/// The form data for changing the current user's password.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    /// The current password, re-verified before anything changes.
    pub current_password: String,
    /// The new password.
    pub new_password: String,
    /// The new password, repeated to catch typos.
    pub confirm_password: String,
}

/// A route handler for changing the current user's password.
///
/// The current password is re-verified first; the new password must pass
/// the strength check and match its confirmation. All validation happens
/// before the stored hash is touched.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn change_password(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    match user.password_hash.verify(&form.current_password) {
        Ok(true) => {}
        Ok(false) => {
            return crate::alert::alert_error(
                StatusCode::BAD_REQUEST,
                "Incorrect password",
                "The current password you entered is wrong.",
            );
        }
        Err(error) => {
            tracing::error!("could not verify password: {error}");
            return Error::HashingError(error.to_string()).into_alert_response();
        }
    }

    if form.new_password != form.confirm_password {
        return crate::alert::alert_error(
            StatusCode::BAD_REQUEST,
            "Passwords do not match",
            "The new password and its confirmation are different.",
        );
    }

    let validated = match ValidatedPassword::new(&form.new_password) {
        Ok(password) => password,
        Err(Error::TooWeak(reason)) => {
            return crate::alert::alert_error(
                StatusCode::BAD_REQUEST,
                "Password is too weak",
                &reason,
            );
        }
        Err(error) => return error.into_alert_response(),
    };

    let new_hash = match PasswordHash::new(validated, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("could not hash new password: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = update_user_password(user_id, &new_hash, &connection) {
        return error.into_alert_response();
    }

    alert_success(
        "Password Changed",
        "Your password has been successfully updated.",
    )
}

/// The form data for deleting the current user's account.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountForm {
    /// The current password, re-verified before deletion.
    pub password: String,
}

/// A route handler for permanently deleting the current user's account,
/// all of their transactions and custom categories.
///
/// On success the auth cookie is invalidated and the client redirected to
/// the log-in page.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_account(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<DeleteAccountForm>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => {}
        Ok(false) => {
            return crate::alert::alert_error(
                StatusCode::BAD_REQUEST,
                "Incorrect password",
                "Account deletion requires your current password.",
            );
        }
        Err(error) => {
            tracing::error!("could not verify password: {error}");
            return Error::HashingError(error.to_string()).into_alert_response();
        }
    }

    if let Err(error) = delete_user(user_id, &connection) {
        return error.into_alert_response();
    }

    tracing::info!("Deleted account {user_id} and all of its data");

    (
        invalidate_auth_cookie(jar),
        HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}



#[cfg(test)]
mod delete_account_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::macros::date;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user, get_user_by_id},
        category::CategoryKind,
        db::initialize,
        endpoints,
        transaction::{Transaction, count_transactions_for_user, create_transaction},
    };

    use super::{DeleteAccountForm, SettingsState, delete_account};

    const PASSWORD: &str = "averystrongtestpassword";

    fn get_test_state() -> (SettingsState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::from_raw_password(PASSWORD, 4).unwrap(),
            &conn,
        )
        .unwrap();

        (
            SettingsState {
                cookie_key: Key::from(&Sha512::digest("foobar")),
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn deletes_account_and_owned_data_after_reauthentication() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Expense, 100.0, date!(2025 - 01 - 05)),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let response = delete_account(
            State(state.clone()),
            Extension(user_id),
            jar,
            Form(DeleteAccountForm {
                password: PASSWORD.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_user_by_id(user_id, &connection), Err(Error::NotFound));
        assert_eq!(count_transactions_for_user(user_id, &connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_keeps_account() {
        let (state, user_id) = get_test_state();

        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let response = delete_account(
            State(state.clone()),
            Extension(user_id),
            jar,
            Form(DeleteAccountForm {
                password: "notmypassword".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_id(user_id, &connection).is_ok());
    }
}
