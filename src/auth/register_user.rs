//! The registration page and the endpoint that creates new user accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, Email, PasswordHash, ValidatedPassword, set_auth_cookie,
        user::create_user,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, email_input, loading_spinner, log_in_register, password_input,
    },
};

/// The minimum number of characters the password should have to be considered valid.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

struct RegisterFormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

impl RegisterFormErrors<'_> {
    fn none() -> Self {
        Self {
            email: None,
            password: None,
            confirm_password: None,
        }
    }
}

fn register_form(email: &str, errors: RegisterFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))

            (password_input("password", "Password", PASSWORD_INPUT_MIN_LENGTH, errors.password))

            (password_input(
                "confirm_password",
                "Confirm password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password,
            ))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Already have an account? "
                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = register_form("", RegisterFormErrors::none());
    let content = log_in_register("Create your account", &form);
    base("Register", &[], &content).into_response()
}

/// The state needed to register a new user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegisterState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegisterState> for Key {
    fn from_ref(state: &RegisterState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for creating a new account.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The email address to register with.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// The password, repeated to catch typos.
    pub confirm_password: String,
}

pub const PASSWORDS_DO_NOT_MATCH_ERROR_MSG: &str = "The passwords do not match.";
pub const DUPLICATE_EMAIL_ERROR_MSG: &str = "An account with this email already exists.";

/// Handler for registration requests via the POST method.
///
/// On success the user is created, logged in and redirected to the dashboard.
/// Validation failures re-render the form with inline error messages and
/// never reach the database.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user(
    State(state): State<RegisterState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = match Email::new(&form.email) {
        Ok(email) => email,
        Err(Error::InvalidEmail(_)) => {
            return register_form(
                &form.email,
                RegisterFormErrors {
                    email: Some("Enter a valid email address."),
                    ..RegisterFormErrors::none()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while validating email: {error}");
            return error.into_response();
        }
    };

    if form.password != form.confirm_password {
        return register_form(
            &form.email,
            RegisterFormErrors {
                confirm_password: Some(PASSWORDS_DO_NOT_MATCH_ERROR_MSG),
                ..RegisterFormErrors::none()
            },
        )
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(Error::TooWeak(reason)) => {
            return register_form(
                &form.email,
                RegisterFormErrors {
                    password: Some(&format!("Password is too weak: {reason}")),
                    ..RegisterFormErrors::none()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while validating password: {error}");
            return error.into_response();
        }
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("Error hashing password: {error}");
            return error.into_response();
        }
    };

    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");

        create_user(email, password_hash, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return register_form(
                &form.email,
                RegisterFormErrors {
                    email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                    ..RegisterFormErrors::none()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Error creating user: {error}");
            return error.into_response();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod register_page_tests {
    use axum::http::StatusCode;

    use crate::endpoints;

    use super::get_register_page;

    #[tokio::test]
    async fn register_page_displays_form() {
        let response = get_register_page().await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();
        let document = scraper::Html::parse_document(&text);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let form = document
            .select(&form_selector)
            .next()
            .expect("expected a form");
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));

        for name in ["email", "password", "confirm_password"] {
            let selector = scraper::Selector::parse(&format!("input[name={name}]")).unwrap();
            assert!(
                form.select(&selector).next().is_some(),
                "want input named {name}"
            );
        }
    }
}
