// Common types and utilities for API handlers

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde::Serialize;
use std::fmt::Display;
use tracing::error;

use crate::errors::{FieldError, SweepError, TrackerError, ValidationError};

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn validation_error(error: ValidationError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(format!("Validation failed: {}", error)),
            errors: Some(error.fields),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message.into())))
}

pub fn not_found(entity: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("{} not found", entity))
}

/// Logs the cause and hides it from the caller
pub fn internal_error(context: &str, err: impl Display) -> ApiError {
    error!("{}: {}", context, err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}

/// Maps a domain error onto the status code the API reports for it
pub fn error_response(err: TrackerError) -> ApiError {
    match err {
        TrackerError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_error(e)),
        ),
        TrackerError::Evaluation(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        TrackerError::Sweep(e @ SweepError::AlreadyRunning { .. }) => {
            api_error(StatusCode::CONFLICT, e.to_string())
        }
        other => internal_error("Request failed", other),
    }
}
