//! The shared create/edit transaction form and its category validation.

use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    category::{
        CategoryKind, CustomCategory, EXPENSE_CATEGORIES, INCOME_CATEGORIES, find_builtin,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
};

/// Check that `category_id` refers to a built-in or custom category of the
/// matching `kind`, and return the category's display name for the name
/// snapshot stored on the transaction.
///
/// # Errors
/// Returns [Error::InvalidCategory] when the id resolves to nothing or to a
/// category of the other kind. This runs in the write path; the read path
/// never validates and falls back to the raw id instead.
pub fn validate_category_for_kind(
    category_id: &str,
    kind: CategoryKind,
    custom: &[CustomCategory],
) -> Result<String, Error> {
    if let Some(builtin) = find_builtin(category_id) {
        if builtin.kind != kind {
            return Err(Error::InvalidCategory(category_id.to_string()));
        }

        return Ok(builtin.name.to_string());
    }

    let custom_match = category_id
        .parse::<i64>()
        .ok()
        .and_then(|id| custom.iter().find(|category| category.id == id));

    match custom_match {
        Some(category) if category.kind == kind => Ok(category.name.to_string()),
        _ => Err(Error::InvalidCategory(category_id.to_string())),
    }
}

/// The values used to pre-fill the transaction form.
pub(super) struct TransactionFormValues {
    pub kind: CategoryKind,
    pub amount: Option<f64>,
    pub date: Date,
    pub category_id: String,
    pub description: String,
}

/// Whether submitting the form creates a new transaction or overwrites an
/// existing one.
#[derive(Clone, Copy, PartialEq)]
pub(super) enum FormMethod {
    Post,
    Put,
}

/// Render the transaction form.
pub(super) fn transaction_form(
    method: FormMethod,
    endpoint: &str,
    submit_label: &str,
    values: &TransactionFormValues,
    custom_categories: &[CustomCategory],
) -> Markup {
    let fields = transaction_form_fields(submit_label, values, custom_categories);
    let form_class = "space-y-4 md:space-y-6 w-full max-w-md";

    match method {
        FormMethod::Post => html! {
            form
                hx-post=(endpoint)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class=(form_class)
            {
                (fields)
            }
        },
        FormMethod::Put => html! {
            form
                hx-put=(endpoint)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class=(form_class)
            {
                (fields)
            }
        },
    }
}

fn transaction_form_fields(
    submit_label: &str,
    values: &TransactionFormValues,
    custom_categories: &[CustomCategory],
) -> Markup {
    let custom_expense = custom_categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Expense);
    let custom_income = custom_categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Income);

    html! {
            div
            {
                span class=(FORM_LABEL_STYLE) { "Type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for kind in [CategoryKind::Expense, CategoryKind::Income] {
                        div class="flex items-center gap-2"
                        {
                            input
                                type="radio"
                                name="kind"
                                id={"kind-" (kind.as_str())}
                                value=(kind.as_str())
                                checked[values.kind == kind]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label
                                for={"kind-" (kind.as_str())}
                                class=(FORM_RADIO_LABEL_STYLE)
                            {
                                @if kind == CategoryKind::Expense { "Expense" } @else { "Income" }
                            }
                        }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount (Rs)" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    min="0.01"
                    required
                    value=[values.amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    required
                    value=(values.date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="category_id"
                    id="category_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    optgroup label="Expense categories"
                    {
                        @for category in EXPENSE_CATEGORIES {
                            option
                                value=(category.id)
                                selected[values.category_id == category.id]
                            {
                                (category.icon) " " (category.name)
                            }
                        }

                        @for category in custom_expense {
                            option
                                value=(category.id)
                                selected[values.category_id == category.id.to_string()]
                            {
                                (category.icon) " " (category.name)
                            }
                        }
                    }

                    optgroup label="Income categories"
                    {
                        @for category in INCOME_CATEGORIES {
                            option
                                value=(category.id)
                                selected[values.category_id == category.id]
                            {
                                (category.icon) " " (category.name)
                            }
                        }

                        @for category in custom_income {
                            option
                                value=(category.id)
                                selected[values.category_id == category.id.to_string()]
                            {
                                (category.icon) " " (category.name)
                            }
                        }
                    }
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    placeholder="What was this for?"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit" id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                (submit_label)
            }
    }
}
