//! User accounts and cookie-based authentication.
//!
//! This module owns the user table, password validation and hashing, the
//! private auth cookies, the log-in/log-out/registration routes and the
//! middleware that guards authenticated pages.

mod cookie;
mod email;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use email::Email;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub use user::{
    User, UserID, create_user, create_user_table, delete_user, get_user_by_email, get_user_by_id,
    update_user_password, verify_credentials,
};

#[cfg(test)]
pub(crate) use cookie::{COOKIE_EXPIRY, COOKIE_USER_ID};

#[cfg(test)]
pub(crate) use middleware::AuthState;
