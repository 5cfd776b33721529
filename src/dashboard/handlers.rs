//! Dashboard HTTP handler and view rendering.

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
    analytics::{
        BreakdownEntry, monthly_stats, resolve_breakdown,
    },
    auth::UserID,
    calendar::{CalendarMode, CalendarQuery, month_key, month_window, month_year_label},
    category::{CustomCategory, get_categories_for_user, resolve_category},
    dashboard::cards::summary_cards,
    endpoints,
    html::{base, calendar_toggle, format_currency, link},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Transaction, get_transactions_for_user},
};

/// How many recent transactions the dashboard lists.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// How many breakdown entries the dashboard lists.
const BREAKDOWN_ENTRY_COUNT: usize = 6;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kathmandu".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    month_label: String,
    balance: f64,
    total_income: f64,
    total_expenses: f64,
    active_categories: usize,
    recent_transactions: Vec<Transaction>,
    breakdown: Vec<BreakdownEntry>,
    custom_categories: Vec<CustomCategory>,
}

/// Display a page with an overview of the current month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
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

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);
    let data = build_dashboard_data(user_id, query.calendar, today, &connection)?;

    Ok(dashboard_view(nav_bar, query.calendar, &data).into_response())
}

/// Fetches and aggregates everything the dashboard shows for the month
/// containing `today` under `calendar`.
fn build_dashboard_data(
    user_id: UserID,
    calendar: CalendarMode,
    today: time::Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let transactions = get_transactions_for_user(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let custom_categories = get_categories_for_user(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let window = month_window(calendar, today);

    // The same records the analytics module aggregates, viewed leniently.
    let views: Vec<_> = transactions
        .iter()
        .map(|transaction| crate::analytics::TransactionView {
            kind: transaction.kind,
            amount: transaction.amount,
            category_id: transaction.category_id.clone(),
            date: Some(transaction.date),
        })
        .collect();

    let stats = monthly_stats(&views, window);
    let active_categories = stats.category_breakdown.len();

    let mut breakdown = resolve_breakdown(&stats.category_breakdown, &custom_categories);
    breakdown.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    breakdown.truncate(BREAKDOWN_ENTRY_COUNT);

    // The month's transactions, most recently touched first.
    let mut recent_transactions: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| window.0 <= transaction.date && transaction.date <= window.1)
        .collect();
    recent_transactions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent_transactions.truncate(RECENT_TRANSACTION_COUNT);

    let month_label = match month_key(calendar, today) {
        Some(key) => month_year_label(calendar, key),
        None => String::new(),
    };

    Ok(DashboardData {
        month_label,
        balance: stats.balance,
        total_income: stats.total_income,
        total_expenses: stats.total_expenses,
        active_categories,
        recent_transactions,
        breakdown,
        custom_categories,
    })
}

fn recent_transactions_card(
    transactions: &[Transaction],
    custom_categories: &[CustomCategory],
) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
        {
            h3 class="text-xl font-semibold" { "Recent Transactions" }
            p class="text-sm text-gray-500 dark:text-gray-400 mb-4" { "Your latest financial activities" }

            @if transactions.is_empty() {
                div class="text-center py-8"
                {
                    p class="text-gray-500 dark:text-gray-400 mb-4" { "No transactions yet" }
                    p { (link(endpoints::NEW_TRANSACTION_VIEW, "Add your first transaction")) }
                }
            } @else {
                div class="space-y-4"
                {
                    @for transaction in transactions {
                        (recent_transaction_row(transaction, custom_categories))
                    }
                }

                p class="mt-4"
                {
                    (link(endpoints::TRANSACTIONS_VIEW, "View All Transactions"))
                }
            }
        }
    )
}

fn recent_transaction_row(
    transaction: &Transaction,
    custom_categories: &[CustomCategory],
) -> Markup {
    let category = resolve_category(&transaction.category_id, custom_categories);
    let is_income = transaction.kind == crate::category::CategoryKind::Income;
    let dot_style = if is_income { "bg-green-500" } else { "bg-red-500" };
    let amount_style = if is_income {
        "text-green-600 dark:text-green-500"
    } else {
        "text-red-600 dark:text-red-500"
    };
    let sign = if is_income { "+" } else { "-" };

    html!(
        div class="flex items-center justify-between"
        {
            div class="flex items-center gap-3"
            {
                div class={"w-2 h-2 rounded-full " (dot_style)} {}

                div
                {
                    p class="font-medium" { (category.name) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (transaction.description) }
                }
            }

            div class={"font-medium " (amount_style)}
            {
                (sign) " " (format_currency(transaction.amount))
            }
        }
    )
}

fn breakdown_card(breakdown: &[BreakdownEntry]) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
        {
            h3 class="text-xl font-semibold" { "Expense Category Breakdown" }
            p class="text-sm text-gray-500 dark:text-gray-400 mb-4" { "Your spending by category this month" }

            @if breakdown.is_empty() {
                div class="text-center py-8"
                {
                    p class="text-gray-500 dark:text-gray-400 mb-4" { "No expense categories yet" }
                    p { (link(endpoints::NEW_TRANSACTION_VIEW, "Add an expense")) }
                }
            } @else {
                div class="space-y-4"
                {
                    @for entry in breakdown {
                        div class="flex items-center justify-between"
                        {
                            div class="flex items-center gap-3"
                            {
                                div class={"w-3 h-3 rounded-full " (entry.color)} {}
                                span class="font-medium" { (entry.label) }
                            }

                            span class="font-medium" { (format_currency(entry.amount)) }
                        }
                    }
                }

                p class="mt-4"
                {
                    (link(endpoints::ANALYTICS_VIEW, "View Analytics"))
                }
            }
        }
    )
}

fn dashboard_view(nav_bar: NavBar, calendar: CalendarMode, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-8 mx-auto max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="flex items-center justify-between max-md:flex-col max-md:gap-4 max-md:items-start mb-6"
            {
                div
                {
                    h1 class="text-3xl font-bold" { "Dashboard" }
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "Financial overview for " (data.month_label) "."
                    }
                }

                div class="flex items-center gap-2"
                {
                    (calendar_toggle(calendar, endpoints::DASHBOARD_VIEW))

                    a
                        href=(endpoints::NEW_TRANSACTION_VIEW)
                        class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                            hover:dark:bg-blue-700 text-white rounded"
                    {
                        "Add Transaction"
                    }
                }
            }

            (summary_cards(
                data.balance,
                data.total_income,
                data.total_expenses,
                data.active_categories,
            ))

            div class="grid gap-6 md:grid-cols-2"
            {
                (recent_transactions_card(&data.recent_transactions, &data.custom_categories))
                (breakdown_card(&data.breakdown))
            }
        }
    );

    base("Dashboard", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::OffsetDateTime;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        calendar::{CalendarMode, CalendarQuery},
        category::CategoryKind,
        db::initialize,
        transaction::{Transaction, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> (DashboardState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::from_raw_password("averystrongtestpassword", 4).unwrap(),
            &conn,
        )
        .unwrap();

        (
            DashboardState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    async fn get_page_html(
        state: DashboardState,
        user_id: UserID,
        calendar: CalendarMode,
    ) -> Html {
        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(CalendarQuery { calendar }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Html::parse_document(&String::from_utf8_lossy(&body))
    }

    #[tokio::test]
    async fn dashboard_page_loads_with_no_data() {
        let (state, user_id) = get_test_state();

        let html = get_page_html(state, user_id, CalendarMode::Gregorian).await;

        let text: String = html.root_element().text().collect();
        assert!(text.contains("No transactions yet"));
        assert!(text.contains("Rs 0.00"));
    }

    #[tokio::test]
    async fn dashboard_shows_current_month_totals_and_recents() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Income, 2000.0, today)
                    .category("salary", "Salary")
                    .description("january pay"),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(CategoryKind::Expense, 500.0, today)
                    .category("food", "Food")
                    .description("momo plate"),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let html = get_page_html(state, user_id, CalendarMode::Gregorian).await;

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Rs 1,500.00"), "balance card");
        assert!(text.contains("Rs 2,000.00"), "income card");
        assert!(text.contains("Rs 500.00"), "expenses card");
        assert!(text.contains("momo plate"), "recent transactions");
        assert!(text.contains("Food"), "breakdown entry");
    }

    #[tokio::test]
    async fn dashboard_offers_both_calendar_toggles() {
        let (state, user_id) = get_test_state();

        let html = get_page_html(state, user_id, CalendarMode::BikramSambat).await;

        for query_value in ["ad", "bs"] {
            let selector =
                Selector::parse(&format!("a[href=\"/dashboard?calendar={query_value}\"]")).unwrap();
            assert!(
                html.select(&selector).next().is_some(),
                "expected a toggle link for {query_value}"
            );
        }
    }

    #[tokio::test]
    async fn bs_mode_labels_the_month_in_bikram_sambat() {
        let (state, user_id) = get_test_state();

        let html = get_page_html(state, user_id, CalendarMode::BikramSambat).await;

        let text: String = html.root_element().text().collect();
        assert!(
            text.contains("BS"),
            "the month label should name the BS month"
        );
    }
}
