use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::Error;

/// An [Error] rendered as a JSON `{"detail": "..."}` body.
///
/// Validation errors are sent to the client as-is. Anything else is logged
/// and replaced with a generic message.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::InvalidRequest(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self.0 {
            Error::InvalidRequest(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            error @ (Error::InvalidTransactionType(_)
            | Error::InvalidTransactionStatus(_)
            | Error::InvalidExportFormat(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, Error::NotFound.to_string()),
            error => {
                tracing::error!("An unexpected error occurred in the API: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
