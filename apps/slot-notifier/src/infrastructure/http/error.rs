//! API error responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::application::services::IngestError;

/// Error body shared by every failing route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Stable error code.
    pub error: &'static str,
    /// Human-readable detail.
    pub message: String,
}

/// API error wrapping an ingestion failure.
#[derive(Debug)]
pub struct ApiError(IngestError);

impl ApiError {
    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(IngestError::InvalidInput(message.into()))
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.0 {
            IngestError::Unauthorized => StatusCode::UNAUTHORIZED,
            IngestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = match &self.0 {
            IngestError::Unauthorized => "Invalid or missing secret".to_string(),
            IngestError::InvalidInput(detail) => detail.clone(),
        };
        let body = ErrorBody {
            success: false,
            error: self.0.reason(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}
