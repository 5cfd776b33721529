//! The analytics page: summary cards, top categories and charts.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    calendar::{CalendarMode, CalendarQuery, month_key, month_window, month_year_label},
    category::get_categories_for_user,
    endpoints,
    html::{HeadElement, base, calendar_toggle, format_currency, link},
    navigation::NavBar,
    timezone::get_local_offset,
};

use super::{
    aggregation::{
        BreakdownEntry, TopCategory, TrendPoint, monthly_stats, monthly_trend, resolve_breakdown,
        savings_rate, top_categories,
    },
    charts::{AnalyticsChart, breakdown_chart, charts_script, trend_chart},
    transaction::get_transaction_views,
};

/// How many months the trend series looks back.
const TREND_MONTHS: usize = 6;

/// How many categories the top-categories list shows.
const TOP_CATEGORY_COUNT: usize = 4;

/// The state needed for displaying the analytics page.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kathmandu".
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the analytics page.
struct AnalyticsData {
    month_label: String,
    total_income: f64,
    total_expenses: f64,
    balance: f64,
    savings_rate: f64,
    top_categories: Vec<TopCategory>,
    charts: [AnalyticsChart; 2],
}

/// Display a page with monthly analytics for the current user.
pub async fn get_analytics_page(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let local_timezone = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let nav_bar = NavBar::new(endpoints::ANALYTICS_VIEW);

    match build_analytics_data(user_id, query.calendar, today, &connection)? {
        Some(data) => Ok(analytics_view(nav_bar, query.calendar, &data).into_response()),
        None => Ok(analytics_no_data_view(nav_bar, query.calendar).into_response()),
    }
}

/// Fetches and aggregates everything the analytics page shows.
///
/// Returns `None` when the user has no transactions at all.
fn build_analytics_data(
    user_id: UserID,
    calendar: CalendarMode,
    today: time::Date,
    connection: &Connection,
) -> Result<Option<AnalyticsData>, Error> {
    let views = get_transaction_views(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    if views.is_empty() {
        return Ok(None);
    }

    let custom_categories = get_categories_for_user(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let window = month_window(calendar, today);
    let stats = monthly_stats(&views, window);
    let breakdown = resolve_breakdown(&stats.category_breakdown, &custom_categories);
    let top = top_categories(&breakdown, TOP_CATEGORY_COUNT);
    let trend = monthly_trend(&views, calendar, today, TREND_MONTHS);

    let month_label = match month_key(calendar, today) {
        Some(key) => month_year_label(calendar, key),
        None => String::new(),
    };

    let charts = build_analytics_charts(&trend, &breakdown);

    Ok(Some(AnalyticsData {
        month_label,
        total_income: stats.total_income,
        total_expenses: stats.total_expenses,
        balance: stats.balance,
        savings_rate: savings_rate(stats.total_income, stats.balance),
        top_categories: top,
        charts,
    }))
}

fn build_analytics_charts(
    trend: &[TrendPoint],
    breakdown: &[BreakdownEntry],
) -> [AnalyticsChart; 2] {
    [
        AnalyticsChart {
            id: "trend-chart",
            options: trend_chart(trend).to_string(),
        },
        AnalyticsChart {
            id: "breakdown-chart",
            options: breakdown_chart(breakdown).to_string(),
        },
    ]
}

fn summary_card(title: &str, value: &str, value_style: &str) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
        {
            p class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class={"text-2xl font-bold " (value_style)} { (value) }
        }
    )
}

/// Renders the analytics page when no transaction data exists.
fn analytics_no_data_view(nav_bar: NavBar, calendar: CalendarMode) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            div class="self-end" { (calendar_toggle(calendar, endpoints::ANALYTICS_VIEW)) }

            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Analytics will show up here once you have some data. Start by "
                (new_transaction_link) "."
            }
        }
    );

    base("Analytics", &[], &content)
}

/// Renders the analytics page with summary cards, top categories and charts.
fn analytics_view(nav_bar: NavBar, calendar: CalendarMode, data: &AnalyticsData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-8 mx-auto max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="flex items-center justify-between max-md:flex-col max-md:gap-4 max-md:items-start mb-6"
            {
                div
                {
                    h1 class="text-3xl font-bold" { "Analytics" }
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "Financial overview for " (data.month_label) "."
                    }
                }

                (calendar_toggle(calendar, endpoints::ANALYTICS_VIEW))
            }

            div class="grid gap-4 md:grid-cols-2 lg:grid-cols-4 mb-6"
            {
                (summary_card("Total Income", &format_currency(data.total_income), "text-green-600"))
                (summary_card("Total Expenses", &format_currency(data.total_expenses), "text-red-600"))
                (summary_card("Balance", &format_currency(data.balance), "text-gray-600 dark:text-gray-300"))
                (summary_card("Savings Rate", &format!("{:.1}%", data.savings_rate), "text-blue-600"))
            }

            section
                id="charts"
                class="w-full mx-auto mb-6"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in &data.charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }
            }

            div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
            {
                h3 class="text-xl font-semibold mb-4" { "Top Expense Categories" }

                @if data.top_categories.is_empty() {
                    p class="text-gray-500 dark:text-gray-400" { "No expenses this month" }
                } @else {
                    div class="space-y-4"
                    {
                        @for category in &data.top_categories {
                            div class="flex items-center justify-between"
                            {
                                span class="font-medium" { (category.label) }

                                div class="flex items-center gap-4"
                                {
                                    span { (format_currency(category.amount)) }
                                    span class="text-sm text-gray-500 dark:text-gray-400 w-14 text-right"
                                    {
                                        (format!("{:.1}%", category.percentage))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&data.charts),
    ];

    base("Analytics", &scripts, &content)
}
