// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Caller authentication via the `x-token` header.
//!
//! Upload handlers validate the request shape before authenticating, so this
//! is a helper they call in sequence rather than a route layer.

use crate::error::{AppError, Result};
use crate::models::{AuthUser, Course};
use crate::AppState;
use axum::http::HeaderMap;

/// Header carrying the caller's access token.
pub const TOKEN_HEADER: &str = "x-token";

/// Extract the raw token, if present and non-empty.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's identity from the `x-token` header.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser> {
    let token = token_from_headers(headers)
        .ok_or_else(|| AppError::Unauthorized(AppError::UNAUTHORIZED.to_string()))?;

    let user = state.auth.resolve_user(token).await.inspect_err(|e| {
        tracing::info!(error = %e, "Token rejected by auth gateway");
    })?;

    tracing::debug!(user_id = %user.id, "Caller authenticated");
    Ok(user)
}

/// Authenticate the caller and check that they own the course.
///
/// Missing course is `NotFound`; someone else's course is `Forbidden`.
pub async fn authorize_course_owner(
    state: &AppState,
    headers: &HeaderMap,
    course_id: &str,
) -> Result<(AuthUser, Course)> {
    let user = authenticate(state, headers).await?;

    let course = state
        .db
        .get_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(AppError::COURSE_NOT_FOUND.to_string()))?;

    if !course.is_owned_by(&user.id) {
        tracing::warn!(
            user_id = %user.id,
            course_id = %course.id,
            owner_id = %course.teacher_id,
            "Course ownership check failed"
        );
        return Err(AppError::Forbidden);
    }

    Ok((user, course))
}
