use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Maximum number of upstream body bytes kept in a `Status` error.
const MAX_ERROR_BODY_LEN: usize = 200;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Failure talking to OpenWeatherMap, or a payload it returned that we cannot use.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("{endpoint} request failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{endpoint} response could not be decoded: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("forecast sample has unrepresentable timestamp {0}")]
    InvalidTimestamp(i64),
}

impl UpstreamError {
    pub(crate) fn status(endpoint: &'static str, status: reqwest::StatusCode, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_ERROR_BODY_LEN) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        UpstreamError::Status {
            endpoint,
            status,
            body,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// `message` is what the caller sees; `source` only reaches the logs.
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),
}

impl AppError {
    pub fn upstream(message: &'static str) -> impl FnOnce(UpstreamError) -> AppError {
        move |source| AppError::Upstream { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream { message, source } => {
                tracing::error!("{}: {}", message, source);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            AppError::OriginNotAllowed(origin) => {
                tracing::warn!("Rejected request from origin '{}'", origin);
                (StatusCode::FORBIDDEN, "Not allowed by CORS".to_string())
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
