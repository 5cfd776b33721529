//! The page listing all of a user's transactions.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    calendar::{CalendarMode, CalendarQuery, format_date},
    category::{CustomCategory, get_categories_for_user, resolve_category},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        calendar_toggle, format_currency, link,
    },
    navigation::NavBar,
    transaction::{
        Transaction, core::get_transactions_for_user, create_endpoint::CreateTransactionState,
    },
};

/// Display a page listing the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_user(user_id, &connection)?;
    let custom_categories = get_categories_for_user(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW);

    Ok(
        transactions_view(nav_bar, &transactions, &custom_categories, query.calendar)
            .into_response(),
    )
}

fn transactions_view(
    nav_bar: NavBar,
    transactions: &[Transaction],
    custom_categories: &[CustomCategory],
    calendar: CalendarMode,
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-8 mx-auto max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Transactions" }

                div class="flex items-center gap-2"
                {
                    (calendar_toggle(calendar, endpoints::TRANSACTIONS_VIEW))

                    a
                        href=(endpoints::NEW_TRANSACTION_VIEW)
                        class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                            hover:dark:bg-blue-700 text-white rounded"
                    {
                        "Add Transaction"
                    }
                }
            }

            @if transactions.is_empty() {
                div class="text-center py-8"
                {
                    p class="text-gray-500 dark:text-gray-400 mb-4" { "No transactions yet" }
                    p { (link(endpoints::NEW_TRANSACTION_VIEW, "Add your first transaction")) }
                }
            } @else {
                div class="relative overflow-x-auto shadow-md rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, custom_categories, calendar))
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_row(
    transaction: &Transaction,
    custom_categories: &[CustomCategory],
    calendar: CalendarMode,
) -> Markup {
    let category = resolve_category(&transaction.category_id, custom_categories);
    let is_income = transaction.kind == crate::category::CategoryKind::Income;
    let amount_style = if is_income {
        "text-green-600 dark:text-green-500"
    } else {
        "text-red-600 dark:text-red-500"
    };
    let sign = if is_income { "+" } else { "-" };

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (format_date(calendar, transaction.date)) }

            td class=(TABLE_CELL_STYLE)
            {
                span class="mr-1" { (category.icon) }
                span { (category.name) }
            }

            td class=(TABLE_CELL_STYLE) { (transaction.description) }

            td class={(TABLE_CELL_STYLE) " text-right font-medium " (amount_style)}
            {
                (sign) " " (format_currency(transaction.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-3"
                {
                    a
                        href=(format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id))
                        class="text-blue-600 hover:text-blue-500 dark:text-blue-500 underline"
                    {
                        "Edit"
                    }

                    button
                        hx-delete=(format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id))
                        hx-confirm="Delete this transaction?"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}
