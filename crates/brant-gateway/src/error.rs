use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brant_common::Error;
use serde_json::json;

/// HTTP boundary for `brant_common::Error`.
///
/// Failure detail stays operator-side: responses carry a status code and a
/// short generic message, never the underlying error text. Logging is the
/// handlers' responsibility, not this mapping's.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not found"),
            Error::MigrationFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "migration failed")
            }
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database error"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
