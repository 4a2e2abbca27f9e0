// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every failure is terminal for the request; nothing is retried here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request (bad body, missing query parameter).
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid `x-token`.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not the owner of the resource.
    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    /// Supabase (auth gateway, PostgREST or Storage) reported a failure.
    #[error("{0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const INVALID_BODY: &'static str = "Invalid body";
    pub const MISSING_LESSON: &'static str = "Give lesson qs";
    pub const UNAUTHORIZED: &'static str = "Unauthorized";
    pub const INVALID_TOKEN: &'static str = "Invalid token";
    pub const COURSE_NOT_FOUND: &'static str = "Course not found";
    pub const LESSON_NOT_FOUND: &'static str = "Lesson not found";

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream error");
                msg.clone()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
