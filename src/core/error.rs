use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
///
/// Repository errors are never returned raw to a handler; the service layer
/// re-wraps them into this taxonomy with contextual metadata. The `details`
/// payload on `BadRequest` carries structured diagnostics for the caller
/// (offending field, computed remaining balance, ...).
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation or business-rule violation
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // 5xx causes carry persistence/serialization detail that must stay
        // out of the response body; log it and surface an opaque message.
        if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return HttpResponse::build(status_code).json(serde_json::json!({
                "error": {
                    "message": "internal server error",
                    "code": status_code.as_u16(),
                }
            }));
        }

        let mut body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        });

        if let AppError::BadRequest {
            details: Some(details),
            ..
        } = self
        {
            body["error"]["details"] = details.clone();
        }

        HttpResponse::build(status_code).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: msg.into(),
            details: None,
        }
    }

    pub fn bad_request_with(msg: impl Into<String>, details: serde_json::Value) -> Self {
        AppError::BadRequest {
            message: msg.into(),
            details: Some(details),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Malformed free-form metadata (must be a JSON object)
    pub fn invalid_metadata(field: &str) -> Self {
        AppError::bad_request_with(
            "invalid metadata: expected a JSON object",
            serde_json::json!({ "field": field }),
        )
    }
}
