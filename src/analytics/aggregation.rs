//! Pure aggregation over transaction views.
//!
//! All functions here are synchronous and re-entrant: given the same
//! transaction views, window and calendar mode they produce the same
//! output. Records without a parseable date are excluded from every
//! aggregate, and negative stored amounts are clamped to zero when summing
//! so a corrupted row cannot invert totals.

use std::collections::HashMap;

use time::Date;

use crate::{
    calendar::{CalendarMode, MonthKey, month_key, month_label, trailing_month_keys},
    category::{CustomCategory, resolve_category},
};

use super::transaction::TransactionView;

use crate::category::CategoryKind;

/// The aggregate figures for one reporting window.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStats {
    /// Sum of income amounts inside the window.
    pub total_income: f64,
    /// Sum of expense amounts inside the window.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub balance: f64,
    /// Expense totals per category id, in first-seen order.
    pub category_breakdown: Vec<(String, f64)>,
}

/// A category total joined with its resolved display name and color.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownEntry {
    /// The resolved display name, or the raw id when resolution failed.
    pub label: String,
    /// The summed amount for the category.
    pub amount: f64,
    /// The category's color class.
    pub color: String,
}

/// One entry of the top-categories ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCategory {
    /// The resolved display name.
    pub label: String,
    /// The summed amount for the category.
    pub amount: f64,
    /// The category's share of the kind's total, in percent.
    pub percentage: f64,
}

/// One month bucket of the trend series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    /// The month key the bucket covers.
    pub key: MonthKey,
    /// The short month label for the chart axis.
    pub label: String,
    /// Income summed over the month.
    pub income: f64,
    /// Expenses summed over the month.
    pub expenses: f64,
}

/// Stored amounts are validated non-negative at the write path, but clamp
/// anyway so a bad row cannot flip the sign of a total.
fn clamped(amount: f64) -> f64 {
    if amount < 0.0 { 0.0 } else { amount }
}

fn in_window(view: &TransactionView, window: (Date, Date)) -> bool {
    match view.date {
        Some(date) => window.0 <= date && date <= window.1,
        None => false,
    }
}

/// Compute the totals and expense category breakdown for the transactions
/// whose date falls inside `window` (inclusive bounds).
pub fn monthly_stats(views: &[TransactionView], window: (Date, Date)) -> MonthlyStats {
    let total_income = views
        .iter()
        .filter(|view| in_window(view, window))
        .filter(|view| view.kind == CategoryKind::Income)
        .map(|view| clamped(view.amount))
        .sum::<f64>();

    let total_expenses = views
        .iter()
        .filter(|view| in_window(view, window))
        .filter(|view| view.kind == CategoryKind::Expense)
        .map(|view| clamped(view.amount))
        .sum::<f64>();

    MonthlyStats {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        category_breakdown: category_breakdown(views, CategoryKind::Expense, window),
    }
}

/// The share of income left over after expenses, in percent.
///
/// Returns `0` when there is no income, never NaN or infinity.
pub fn savings_rate(total_income: f64, balance: f64) -> f64 {
    if total_income > 0.0 {
        balance / total_income * 100.0
    } else {
        0.0
    }
}

/// Sum amounts per category id for transactions of `kind` inside `window`,
/// in first-seen order.
pub fn category_breakdown(
    views: &[TransactionView],
    kind: CategoryKind,
    window: (Date, Date),
) -> Vec<(String, f64)> {
    breakdown_totals(views.iter().filter(|view| in_window(view, window)), kind)
}

fn breakdown_totals<'a>(
    views: impl Iterator<Item = &'a TransactionView>,
    kind: CategoryKind,
) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for view in views.filter(|view| view.kind == kind) {
        if !totals.contains_key(&view.category_id) {
            order.push(view.category_id.clone());
        }
        *totals.entry(view.category_id.clone()).or_insert(0.0) += clamped(view.amount);
    }

    order
        .into_iter()
        .map(|category_id| {
            let total = totals[&category_id];
            (category_id, total)
        })
        .collect()
}

/// Join a breakdown against the resolved categories for display.
pub fn resolve_breakdown(
    breakdown: &[(String, f64)],
    custom_categories: &[CustomCategory],
) -> Vec<BreakdownEntry> {
    breakdown
        .iter()
        .map(|(category_id, amount)| {
            let resolved = resolve_category(category_id, custom_categories);
            BreakdownEntry {
                label: resolved.name,
                amount: *amount,
                color: resolved.color,
            }
        })
        .collect()
}

/// The top `n` categories of a breakdown, sorted descending by amount.
///
/// Percentages are computed against the total over *all* categories in the
/// breakdown, not just the returned entries, so the percentages over the
/// full breakdown always sum to 100 when the total is positive. Ties keep
/// their first-seen order (the sort is stable).
pub fn top_categories(entries: &[BreakdownEntry], n: usize) -> Vec<TopCategory> {
    let total: f64 = entries.iter().map(|entry| entry.amount).sum();

    let mut sorted: Vec<&BreakdownEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    sorted
        .into_iter()
        .take(n)
        .map(|entry| TopCategory {
            label: entry.label.clone(),
            amount: entry.amount,
            percentage: if total > 0.0 {
                entry.amount / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Bucket transactions by calendar month under `mode` over the trailing
/// `months` months ending at the month containing `today`.
///
/// Every month in the window gets a bucket even when no transaction falls
/// in it, and buckets are returned in chronological order.
pub fn monthly_trend(
    views: &[TransactionView],
    mode: CalendarMode,
    today: Date,
    months: usize,
) -> Vec<TrendPoint> {
    let keys = trailing_month_keys(mode, today, months);

    let mut buckets: HashMap<MonthKey, (f64, f64)> =
        keys.iter().map(|&key| (key, (0.0, 0.0))).collect();

    for view in views {
        let Some(date) = view.date else { continue };
        let Some(key) = month_key(mode, date) else {
            continue;
        };
        let Some(bucket) = buckets.get_mut(&key) else {
            continue;
        };

        match view.kind {
            CategoryKind::Income => bucket.0 += clamped(view.amount),
            CategoryKind::Expense => bucket.1 += clamped(view.amount),
        }
    }

    keys.into_iter()
        .map(|key| {
            let (income, expenses) = buckets[&key];
            TrendPoint {
                key,
                label: month_label(mode, key),
                income,
                expenses,
            }
        })
        .collect()
}

#[cfg(test)]
mod monthly_stats_tests {
    use time::macros::date;

    use crate::category::CategoryKind;

    use super::{super::transaction::TransactionView, monthly_stats, savings_rate};

    fn view(kind: CategoryKind, amount: f64, category_id: &str, date: time::Date) -> TransactionView {
        TransactionView {
            kind,
            amount,
            category_id: category_id.to_string(),
            date: Some(date),
        }
    }

    const JANUARY_2025: (time::Date, time::Date) = (date!(2025 - 01 - 01), date!(2025 - 01 - 31));

    #[test]
    fn computes_the_worked_example() {
        // expense 500 (food) + income 2000 (salary) in January 2025.
        let views = vec![
            view(CategoryKind::Expense, 500.0, "food", date!(2025 - 01 - 05)),
            view(CategoryKind::Income, 2000.0, "salary", date!(2025 - 01 - 10)),
        ];

        let stats = monthly_stats(&views, JANUARY_2025);

        assert_eq!(stats.total_income, 2000.0);
        assert_eq!(stats.total_expenses, 500.0);
        assert_eq!(stats.balance, 1500.0);
        assert_eq!(savings_rate(stats.total_income, stats.balance), 75.0);
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let views = vec![
            view(CategoryKind::Income, 100.0, "salary", date!(2025 - 01 - 02)),
            view(CategoryKind::Income, 50.5, "investment", date!(2025 - 01 - 03)),
            view(CategoryKind::Expense, 70.25, "food", date!(2025 - 01 - 04)),
        ];

        let stats = monthly_stats(&views, JANUARY_2025);

        assert_eq!(stats.balance, stats.total_income - stats.total_expenses);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let views = vec![
            view(CategoryKind::Expense, 1.0, "food", date!(2025 - 01 - 01)),
            view(CategoryKind::Expense, 2.0, "food", date!(2025 - 01 - 31)),
            view(CategoryKind::Expense, 4.0, "food", date!(2025 - 02 - 01)),
            view(CategoryKind::Expense, 8.0, "food", date!(2024 - 12 - 31)),
        ];

        let stats = monthly_stats(&views, JANUARY_2025);

        assert_eq!(stats.total_expenses, 3.0);
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let views = vec![view(CategoryKind::Expense, 500.0, "food", date!(2025 - 01 - 05))];

        let stats = monthly_stats(&views, JANUARY_2025);
        let rate = savings_rate(stats.total_income, stats.balance);

        assert_eq!(rate, 0.0);
        assert!(rate.is_finite());
    }

    #[test]
    fn unparseable_dates_are_excluded_from_all_sums() {
        let views = vec![
            view(CategoryKind::Income, 2000.0, "salary", date!(2025 - 01 - 10)),
            TransactionView {
                kind: CategoryKind::Income,
                amount: 999.0,
                category_id: "salary".to_string(),
                date: None,
            },
        ];

        let stats = monthly_stats(&views, JANUARY_2025);

        assert_eq!(stats.total_income, 2000.0);
    }

    #[test]
    fn negative_amounts_are_clamped_to_zero() {
        let views = vec![
            view(CategoryKind::Expense, 100.0, "food", date!(2025 - 01 - 05)),
            view(CategoryKind::Expense, -40.0, "food", date!(2025 - 01 - 06)),
        ];

        let stats = monthly_stats(&views, JANUARY_2025);

        assert_eq!(stats.total_expenses, 100.0);
    }

    #[test]
    fn breakdown_supports_income_kind() {
        let views = vec![
            view(CategoryKind::Income, 2000.0, "salary", date!(2025 - 01 - 10)),
            view(CategoryKind::Income, 300.0, "investment", date!(2025 - 01 - 12)),
            view(CategoryKind::Expense, 500.0, "food", date!(2025 - 01 - 05)),
        ];

        let breakdown = super::category_breakdown(&views, CategoryKind::Income, JANUARY_2025);

        assert_eq!(
            breakdown,
            vec![
                ("salary".to_string(), 2000.0),
                ("investment".to_string(), 300.0)
            ]
        );
    }

    #[test]
    fn breakdown_only_counts_expenses() {
        let views = vec![
            view(CategoryKind::Expense, 100.0, "food", date!(2025 - 01 - 05)),
            view(CategoryKind::Expense, 50.0, "transport", date!(2025 - 01 - 06)),
            view(CategoryKind::Expense, 25.0, "food", date!(2025 - 01 - 07)),
            view(CategoryKind::Income, 2000.0, "salary", date!(2025 - 01 - 10)),
        ];

        let stats = monthly_stats(&views, JANUARY_2025);

        assert_eq!(
            stats.category_breakdown,
            vec![
                ("food".to_string(), 125.0),
                ("transport".to_string(), 50.0)
            ]
        );
    }
}
