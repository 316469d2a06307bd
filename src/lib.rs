//! Paymock is a web app for generating, browsing, exporting and clearing mock
//! payment transactions.
//!
//! This library provides a JSON REST API backed by SQLite and a dashboard
//! that serves HTML pages. The dashboard talks to a [TransactionBackend],
//! which is either the local database or a remote API speaking the same
//! contract.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_RESWAP;
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod backend;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use backend::{HttpBackend, LocalBackend, TransactionBackend};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    ClearResponse, ExportFile, ExportFormat, ExportRequest, GenerateRequest, Transaction,
    TransactionQuery, TransactionStats, TransactionStatus, TransactionType, TypeBreakdown,
    generate_transactions,
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request to generate, list or export transactions had a field outside
    /// its allowed range.
    ///
    /// The string describes which field was rejected and why, and is safe to
    /// show to the client.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A string could not be parsed as a transaction type.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// A string could not be parsed as a transaction status.
    #[error("\"{0}\" is not a valid transaction status")]
    InvalidTransactionStatus(String),

    /// A string could not be parsed as an export format.
    #[error("\"{0}\" is not a valid export format, expected \"json\" or \"csv\"")]
    InvalidExportFormat(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing transactions as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing transactions as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// The remote transaction API could not be reached or sent a response
    /// that could not be read.
    #[error("the transaction service could not be reached: {0}")]
    BackendUnavailable(String),

    /// The remote transaction API rejected a request.
    #[error("the transaction service responded with status {status}: {detail}")]
    BackendStatus {
        /// The HTTP status code of the response.
        status: u16,
        /// The error detail sent by the service, or the raw body.
        detail: String,
    },

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::BackendUnavailable(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                InternalServerError::invalid_timezone(&timezone).into_response()
            }
            Error::BackendUnavailable(_) | Error::BackendStatus { .. } => {
                InternalServerError::service_unavailable().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The status code to respond with when this error is the outcome of a request.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidTransactionStatus(_)
            | Error::InvalidExportFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BackendStatus { status: 422, .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::BackendUnavailable(_) | Error::BackendStatus { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as an error toast headed by `message`, e.g. "Error
    /// generating transactions".
    ///
    /// The details shown under the heading depend on the error: validation
    /// errors are shown verbatim, everything else gets a generic description.
    /// The toast always replaces the contents of the alert container, whatever
    /// swap style the triggering element asked for.
    fn into_alert_response(self, message: &str) -> Response {
        let status_code = self.status_code();

        let details = match self {
            Error::InvalidRequest(detail) => detail,
            Error::InvalidTransactionType(_)
            | Error::InvalidTransactionStatus(_)
            | Error::InvalidExportFormat(_) => self.to_string(),
            Error::BackendStatus {
                status: 422,
                detail,
            } => detail,
            Error::BackendUnavailable(_) | Error::BackendStatus { .. } => {
                "The transaction service could not complete the request.".to_owned()
            }
            _ => "An unexpected error occurred, check the server logs for more details.".to_owned(),
        };

        (
            status_code,
            [(HX_RESWAP, "innerHTML")],
            Alert::Error {
                message: message.to_owned(),
                details,
            },
        )
            .into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn validation_errors_are_unprocessable() {
        assert_eq!(
            Error::InvalidRequest("count".to_owned()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::InvalidExportFormat("xml".to_owned()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn remote_validation_errors_are_unprocessable() {
        assert_eq!(
            Error::BackendStatus {
                status: 422,
                detail: "count must be between 1 and 1000, got 0".to_owned()
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn backend_errors_are_bad_gateway() {
        assert_eq!(
            Error::BackendUnavailable("connection refused".to_owned()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::BackendStatus {
                status: 500,
                detail: "boom".to_owned()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn alert_response_shows_validation_detail() {
        let response = Error::InvalidRequest("count must be between 1 and 1000, got 0".to_owned())
            .into_alert_response("Error generating transactions");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Error generating transactions"), "got {text}");
        assert!(text.contains("count must be between 1 and 1000"), "got {text}");
    }

    #[tokio::test]
    async fn backend_error_page_names_the_service() {
        let response = Error::BackendUnavailable("connection refused".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = parse_html_fragment(response)
            .await
            .root_element()
            .text()
            .collect::<String>();
        assert!(text.contains("Transaction Service Unavailable"), "got {text}");
        assert!(!text.contains("connection refused"), "got {text}");
    }

    #[test]
    fn alert_response_swaps_into_container() {
        let response = Error::BackendUnavailable("connection refused".to_owned())
            .into_alert_response("Error fetching transactions");

        assert_eq!(
            response.headers().get("hx-reswap").map(|value| value.as_bytes()),
            Some(&b"innerHTML"[..])
        );
    }

    #[tokio::test]
    async fn alert_response_hides_internal_details() {
        let response = Error::DatabaseLockError.into_alert_response("Error clearing transactions");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(!text.contains("lock"), "got {text}");
        assert!(text.contains("check the server logs"), "got {text}");
    }
}
