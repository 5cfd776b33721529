//! Monthly analytics over a user's transactions.
//!
//! The aggregation functions are pure and synchronous: they take a slice of
//! transaction views, a reporting window and a calendar mode, and produce
//! totals, category breakdowns, top-category rankings and month-bucketed
//! trend series. Handlers re-run them on every request; there is no cached
//! state to invalidate.

mod aggregation;
mod charts;
mod handlers;
mod transaction;

pub use aggregation::{
    BreakdownEntry, MonthlyStats, TopCategory, TrendPoint, category_breakdown, monthly_stats,
    monthly_trend, resolve_breakdown, savings_rate, top_categories,
};
pub use handlers::get_analytics_page;
pub use transaction::{TransactionView, get_transaction_views};
