//! The page to display when a full page request fails on the server side.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 500 page with a short description of what went wrong and how to fix it.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalServerError {
    pub description: String,
    pub fix: String,
}

impl Default for InternalServerError {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.".to_owned(),
            fix: "Try again later or check the server logs".to_owned(),
        }
    }
}

impl InternalServerError {
    /// The page for when the remote transaction API failed or could not be reached.
    pub fn service_unavailable() -> Self {
        Self {
            description: "Transaction Service Unavailable".to_owned(),
            fix: "Check that the transaction API is running and try again.".to_owned(),
        }
    }

    /// The page for a server configured with a timezone that does not exist.
    pub fn invalid_timezone(timezone: &str) -> Self {
        Self {
            description: "Invalid Timezone Settings".to_owned(),
            fix: format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to a valid, canonical timezone string"
            ),
        }
    }

    fn into_html(self) -> Html<String> {
        Html(
            error_view(
                "Internal Server Error",
                "500",
                &self.description,
                &self.fix,
            )
            .into_string(),
        )
    }
}

impl IntoResponse for InternalServerError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{InternalServerError, get_internal_server_error_page};

    #[tokio::test]
    async fn default_page_is_500() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
    }

    #[tokio::test]
    async fn service_unavailable_page_says_what_to_check() {
        let response = InternalServerError::service_unavailable().into_response();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Transaction Service Unavailable"));
        assert!(text.contains("transaction API is running"));
    }

    #[test]
    fn invalid_timezone_names_the_timezone() {
        let page = InternalServerError::invalid_timezone("Mars/Olympus_Mons");

        assert!(page.fix.contains("\"Mars/Olympus_Mons\""), "got {}", page.fix);
    }
}
