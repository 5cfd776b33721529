//! Account settings: profile info, password change, custom category
//! management, data export and account deletion.

mod handlers;

pub use handlers::{change_password, delete_account, get_settings_page};
