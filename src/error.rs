use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad or missing provider selector, malformed or absent history.
    #[error("{0}")]
    InvalidRequest(String),

    /// A required credential was absent from the process environment.
    #[error("{0} not set")]
    MissingCredential(&'static str),

    /// Non-success status from the provider. Propagated with the
    /// upstream's status code and raw error body, never retried.
    #[error("Upstream API error: {status}")]
    Upstream { status: StatusCode, details: String },

    /// Anything else, including network failures.
    #[error("Server error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::InvalidRequest(message) => {
                tracing::warn!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
            }
            GatewayError::MissingCredential(var) => {
                tracing::error!("Missing credential: {} not set", var);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("{} not set", var) })),
                )
            }
            GatewayError::Upstream { status, details } => {
                tracing::error!("Upstream API error {}: {}", status, details);
                (
                    status,
                    Json(json!({ "error": "Upstream API error", "details": details })),
                )
            }
            GatewayError::Internal(message) => {
                tracing::error!("Server error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Server error", "details": message })),
                )
            }
        }
        .into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
