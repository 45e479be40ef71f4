use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

/// Errors surfaced by the social API.
///
/// Publishing failures for individual destinations never appear here; they
/// are recorded per destination in the result list. A failed token refresh is
/// not an error either: the stale token stays in place and the next call
/// that needed it fails on its own terms.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} is not configured")]
    ConfigurationMissing(&'static str),
    #[error("failed to parse model response: {0}")]
    UpstreamParsing(String),
    #[error("upstream call failed: {0}")]
    UpstreamCall(String),
    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            ApiError::InvalidInput(_) | ApiError::ConfigurationMissing(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UpstreamParsing(_) | ApiError::UpstreamCall(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
