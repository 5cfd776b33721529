//! The stat cards shown at the top of the dashboard.

use maud::{Markup, html};

use crate::html::format_currency;

/// A single stat card with a title, a value and a subtitle.
pub(super) fn stat_card(title: &str, value: &str, value_style: &str, subtitle: &str) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
        {
            div class="flex flex-row items-center justify-between pb-2"
            {
                h3 class="text-sm font-medium" { (title) }
            }

            div class={"text-2xl font-bold " (value_style)} { (value) }
            p class="text-xs text-gray-500 dark:text-gray-400" { (subtitle) }
        }
    )
}

/// The four headline cards: balance, income, expenses and the number of
/// expense categories active in the window.
pub(super) fn summary_cards(
    balance: f64,
    total_income: f64,
    total_expenses: f64,
    active_categories: usize,
) -> Markup {
    html!(
        div class="grid gap-4 md:grid-cols-2 lg:grid-cols-4 mb-6"
        {
            (stat_card(
                "Total Balance",
                &format_currency(balance),
                "text-gray-600 dark:text-gray-300",
                "This month",
            ))
            (stat_card(
                "Total Income",
                &format_currency(total_income),
                "text-green-600",
                "This month",
            ))
            (stat_card(
                "Total Expenses",
                &format_currency(total_expenses),
                "text-red-600",
                "This month",
            ))
            (stat_card(
                "Expense Categories",
                &active_categories.to_string(),
                "",
                "Active this month",
            ))
        }
    )
}
