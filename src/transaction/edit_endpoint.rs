//! Defines the endpoint for overwriting an existing transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    auth::UserID,
    category::get_categories_for_user,
    database_id::TransactionId,
    endpoints,
    transaction::{
        Transaction,
        core::update_transaction,
        create_endpoint::{CreateTransactionState, TransactionForm},
        form::validate_category_for_kind,
    },
};

/// A route handler for overwriting an existing transaction's fields,
/// redirects to the transactions view on success.
///
/// The edit is a full-field overwrite: every user-editable field takes the
/// submitted value and `updated_at` is refreshed.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn edit_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> impl IntoResponse {
    if form.amount <= 0.0 {
        return Error::NonPositiveAmount(form.amount).into_alert_response();
    }

    let connection = state.db_connection.lock().unwrap();

    let custom_categories = match get_categories_for_user(user_id, &connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_alert_response(),
    };

    let category_name =
        match validate_category_for_kind(&form.category_id, form.kind, &custom_categories) {
            Ok(name) => name,
            Err(error) => return error.into_alert_response(),
        };

    let builder = Transaction::build(form.kind, form.amount, form.date)
        .category(&form.category_id, &category_name)
        .description(&form.description);

    if let Err(error) = update_transaction(transaction_id, builder, user_id, &connection) {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
