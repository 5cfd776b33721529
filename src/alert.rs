//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element of the base
//! layout via HTMX's `hx-target-error` extension target.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// Render an error alert fragment with the given `status_code`.
pub fn alert_error(status_code: StatusCode, message: &str, details: &str) -> Response {
    (status_code, alert_markup("Error", message, details)).into_response()
}

/// Render a success alert fragment.
pub fn alert_success(message: &str, details: &str) -> Response {
    (StatusCode::OK, alert_markup("Success", message, details)).into_response()
}

fn alert_markup(kind: &str, message: &str, details: &str) -> Markup {
    let color_style = if kind == "Error" {
        "text-red-800 border-red-300 bg-red-50 dark:text-red-400 dark:border-red-800"
    } else {
        "text-green-800 border-green-300 bg-green-50 dark:text-green-400 dark:border-green-800"
    };

    html!(
        div
            class={"flex flex-col p-4 mb-4 border rounded-lg dark:bg-gray-800 " (color_style)}
            role="alert"
        {
            span class="font-medium" { (message) }

            @if !details.is_empty() {
                span class="text-sm" { (details) }
            }

            button
                type="button"
                class="self-end text-sm underline cursor-pointer"
                onclick="this.parentElement.remove()"
            {
                "Dismiss"
            }
        }
    )
}

#[cfg(test)]
mod alert_tests {
    use axum::http::StatusCode;

    use super::{alert_error, alert_success};

    #[tokio::test]
    async fn error_alert_has_status_and_message() {
        let response = alert_error(StatusCode::BAD_REQUEST, "Invalid amount", "Enter a number");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Invalid amount"));
        assert!(text.contains("Enter a number"));
    }

    #[tokio::test]
    async fn success_alert_is_ok() {
        let response = alert_success("Saved", "");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
