//! Categories for classifying transactions.
//!
//! A transaction's category is either one of a fixed built-in set known at
//! compile time or a custom category created by the user. Custom categories
//! are stored per user; built-ins are shared by everyone. Category
//! resolution never fails: an id that no longer matches anything renders
//! with the raw id and a default icon and color.

mod builtin;
mod db;
mod domain;
mod endpoints;

pub use builtin::{
    BuiltinCategory, DEFAULT_COLOR, DEFAULT_ICON, EXPENSE_CATEGORIES, INCOME_CATEGORIES,
    find_builtin,
};
pub use db::{
    CustomCategory, create_category, create_category_table, delete_category,
    get_categories_for_user, get_category,
};
pub use domain::{CategoryKind, CategoryName, ResolvedCategory, resolve_category};
pub use endpoints::{create_category_endpoint, delete_category_endpoint};
