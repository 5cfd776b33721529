//! Dashboard module
//!
//! Provides the landing page showing the current month at a glance: stat
//! cards, the most recent transactions and the expense category breakdown,
//! under either calendar system.

mod cards;
mod handlers;

pub use handlers::get_dashboard_page;
