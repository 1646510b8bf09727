use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Handler-level error type.
///
/// Every failure renders as `{"success": false, "error": "..."}` — the
/// shape existing file-sync clients parse.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request was malformed (e.g. missing multipart file part).
    #[error("{0}")]
    BadRequest(String),

    /// No resolution strategy produced a file.
    #[error("File not found")]
    FileNotFound,

    /// Storage I/O failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::FileNotFound => (StatusCode::NOT_FOUND, "File not found".to_string()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal file server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
