//! API error handling

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error type
///
/// Renders as `{"detail": message}`, or as
/// `{"error": message, "details": details}` for inference process failures.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn gateway_timeout(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, msg)
    }

    pub fn processing_failed(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: "Processing failed".to_string(),
            details: Some(details.into()),
        }
    }

    /// Older clients expect process failures with a 200 status.
    pub fn with_legacy_status(mut self, legacy: bool) -> Self {
        if legacy && self.details.is_some() {
            self.status = StatusCode::OK;
        }
        self
    }

    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({
                "error": self.message,
                "details": details
            })),
            None => Json(json!({ "detail": self.message })),
        };
        (self.status, body).into_response()
    }
}

impl From<lipsync_core::Error> for ApiError {
    fn from(err: lipsync_core::Error) -> Self {
        use lipsync_core::Error;

        match err {
            Error::FaceNotFound(_) => ApiError::bad_request(err.to_string()),
            Error::ProcessFailed(details) => ApiError::processing_failed(details),
            Error::Timeout(_) => ApiError::gateway_timeout(err.to_string()),
            Error::InferenceUnavailable(_) => ApiError::service_unavailable(err.to_string()),
            _ => ApiError::internal(err.to_string()),
        }
    }
}

/// Keeps the status axum picks for a broken or oversized form, 413 included.
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), err.body_text())
    }
}
