//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use vitalis_core::{PredictorError, RangeViolation, ValidationError};

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// Body could not be decoded into measurements.
    Payload(JsonRejection),
    /// Measurements outside their declared ranges.
    Validation(ValidationError),
    Internal(String),
}

impl AppError {
    /// Creates an Internal error from any error type.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Payload(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<PredictorError> for AppError {
    fn from(e: PredictorError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<RangeViolation>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            // Syntax, data and content-type rejections all answer 422.
            AppError::Payload(rejection) => (StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text(), Vec::new()),
            AppError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), e.violations),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new()),
        };
        (status, Json(ErrorResponse { success: false, error, details })).into_response()
    }
}
