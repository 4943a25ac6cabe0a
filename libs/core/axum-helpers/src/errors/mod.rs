pub mod handlers;
pub mod responses;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Every non-2xx response carries this body: a human-readable `message`
/// plus any structured metadata flattened alongside it (for example the
/// offending id on a 404, or per-field `errors` on a validation failure).
///
/// # JSON Example
///
/// ```json
/// {
///   "message": "Task not found",
///   "taskId": "0192a3b4-..."
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Additional error metadata, flattened into the body
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub meta: Map<String, Value>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain errors convert into this enum; `IntoResponse` below is the only
/// place HTTP error bodies are constructed, so every endpoint produces the
/// same shape.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {message}")]
    NotFound {
        message: String,
        meta: Map<String, Value>,
    },

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// 404 with a plain message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            meta: Map::new(),
        }
    }

    /// 404 carrying one structured metadata field (e.g. the offending id).
    pub fn not_found_with_meta(
        message: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let mut meta = Map::new();
        meta.insert(key.into(), value.into());
        Self::NotFound {
            message: message.into(),
            meta,
        }
    }
}

/// Convert validator field errors into a `{field: [{code, message, params}]}` map.
fn validation_meta(errors: &ValidationErrors) -> Value {
    let details: Map<String, Value> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<Value> = errors
                .iter()
                .map(|err| {
                    json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect();

    Value::Object(details)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // One (status, body, log detail) triple per error kind. The log
        // detail may carry internals; the client body never does.
        let (status, body, detail) = match self {
            AppError::JsonExtractorRejection(e) => {
                // Malformed bodies and out-of-enum values are client errors;
                // axum's own 422 for data errors is folded into 400.
                let detail = format!("JSON extraction error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(e.body_text()),
                    detail,
                )
            }
            AppError::QueryExtractorRejection(e) => {
                let status = e.status();
                let detail = format!("Query extraction error: {:?}", e);
                (status, ErrorResponse::new(e.body_text()), detail)
            }
            AppError::ValidationError(e) => {
                let body = ErrorResponse::new("Request validation failed")
                    .with_meta("errors", validation_meta(&e));
                (
                    StatusCode::BAD_REQUEST,
                    body,
                    format!("Validation error: {}", e),
                )
            }
            AppError::UuidError(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid UUID format"),
                format!("UUID error: {}", e),
            ),
            AppError::BadRequest(msg) => {
                let detail = format!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg), detail)
            }
            AppError::NotFound { message, meta } => {
                let detail = format!("Not found: {}", message);
                (StatusCode::NOT_FOUND, ErrorResponse { message, meta }, detail)
            }
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("An internal server error occurred"),
                format!("Internal server error: {}", msg),
            ),
            AppError::ServiceUnavailable(msg) => {
                let detail = format!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new(msg),
                    detail,
                )
            }
        };

        // Exactly one log entry per failure.
        if status.is_server_error() {
            tracing::error!(status = %status, "{}", detail);
        } else {
            tracing::warn!(status = %status, "{}", detail);
        }

        (status, Json(body)).into_response()
    }
}
