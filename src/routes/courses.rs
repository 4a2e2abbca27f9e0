// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course upload routes (lesson content and cover images).
//!
//! Both handlers follow the same sequence: validate the request shape,
//! authenticate, check course ownership, upload to object storage with
//! upsert, then write the object's public URL back into the row.

use crate::error::{AppError, Result};
use crate::middleware::auth::authorize_course_owner;
use crate::models::{Course, CourseLesson};
use crate::sanitize::sanitize_markdown;
use crate::services::storage::{course_cover_key, lesson_content_key};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use mime::Mime;
use serde::Deserialize;
use std::sync::Arc;

/// Content type recorded for sanitized markdown.
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";
const MARKDOWN_EXT: &str = "md";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses/{id}/content", post(upload_lesson_content))
        .route("/courses/{id}/upload_cover", post(upload_course_cover))
}

// ─── Request Parsing ─────────────────────────────────────────

#[derive(Deserialize)]
struct ContentQuery {
    /// Lesson to attach the content to
    lesson: Option<String>,
    /// Markdown flag (`md=1`)
    md: Option<String>,
}

/// Request body as a web framework would hand it over.
#[derive(Debug, PartialEq)]
enum UploadBody {
    Text(String),
    Bytes(Bytes),
}

/// Parse the request's content type. Unparseable values count as absent.
fn request_content_type(headers: &HeaderMap) -> Option<Mime> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.parse::<Mime>().ok())
}

/// Decide whether the body is text, raw bytes, or a structured payload.
///
/// JSON and form payloads are decoded into objects by web frameworks, so
/// they are neither a string nor a byte buffer and are rejected.
fn classify_body(content_type: Option<&Mime>, body: Bytes) -> Result<UploadBody> {
    let Some(ct) = content_type else {
        return Ok(UploadBody::Bytes(body));
    };

    let structured = [
        mime::APPLICATION_JSON,
        mime::APPLICATION_WWW_FORM_URLENCODED,
        mime::MULTIPART_FORM_DATA,
    ]
    .iter()
    .any(|m| m.essence_str() == ct.essence_str());
    if structured {
        return Err(AppError::Validation(AppError::INVALID_BODY.to_string()));
    }

    if ct.type_() == mime::TEXT {
        return String::from_utf8(body.to_vec())
            .map(UploadBody::Text)
            .map_err(|_| AppError::Validation(AppError::INVALID_BODY.to_string()));
    }

    Ok(UploadBody::Bytes(body))
}

/// `md` is on unless absent, empty, `0` or `false`.
fn markdown_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

/// File extension from a content type's subtype (`image/png` → `png`).
///
/// A structured-syntax suffix is not part of the subtype, so `image/svg+xml`
/// gives `svg`; the stored content type keeps the full `image/svg+xml`.
fn extension_for(ct: &Mime) -> String {
    ct.subtype().as_str().to_ascii_lowercase()
}

// ─── Lesson Content ──────────────────────────────────────────

/// Upload a lesson's content and point the lesson at it.
///
/// Markdown bodies (`md=1` with a text body) are sanitized before upload.
async fn upload_lesson_content(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    Query(params): Query<ContentQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CourseLesson>> {
    let content_type = request_content_type(&headers);
    let body = classify_body(content_type.as_ref(), body)?;

    let lesson_id = params
        .lesson
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation(AppError::MISSING_LESSON.to_string()))?;
    let markdown = markdown_flag(params.md.as_deref());

    let (user, course) = authorize_course_owner(&state, &headers, &course_id).await?;

    let lesson = state
        .db
        .get_course_lesson(&lesson_id, &course.id)
        .await?
        .ok_or_else(|| AppError::NotFound(AppError::LESSON_NOT_FOUND.to_string()))?;

    let (ext, stored_type) = if markdown {
        (MARKDOWN_EXT.to_string(), MARKDOWN_CONTENT_TYPE.to_string())
    } else {
        let ct = content_type
            .as_ref()
            .ok_or_else(|| AppError::Validation("Missing content type".to_string()))?;
        (extension_for(ct), ct.to_string())
    };

    let payload = match body {
        UploadBody::Text(text) if markdown => Bytes::from(sanitize_markdown(&text)),
        UploadBody::Text(text) => Bytes::from(text),
        UploadBody::Bytes(bytes) => bytes,
    };

    let key = lesson_content_key(&lesson.id, &ext);
    state.storage.upload(&key, payload, &stored_type).await?;
    let public_url = state.storage.public_url(&key);

    let updated = state
        .db
        .set_lesson_item_link(&lesson.id, &public_url)
        .await?
        .ok_or_else(|| AppError::NotFound(AppError::LESSON_NOT_FOUND.to_string()))?;

    tracing::info!(
        user_id = %user.id,
        course_id = %course.id,
        lesson_id = %updated.id,
        key = %key,
        markdown,
        "Lesson content updated"
    );

    Ok(Json(updated))
}

// ─── Course Cover ────────────────────────────────────────────

/// Upload a course's cover image and point the course at it.
async fn upload_course_cover(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Course>> {
    let image_type = request_content_type(&headers)
        .filter(|ct| ct.type_() == mime::IMAGE)
        .ok_or_else(|| AppError::Validation(AppError::INVALID_BODY.to_string()))?;

    let (user, course) = authorize_course_owner(&state, &headers, &course_id).await?;

    let key = course_cover_key(&course.id, &extension_for(&image_type));
    state
        .storage
        .upload(&key, body, image_type.as_ref())
        .await?;
    let public_url = state.storage.public_url(&key);

    let updated = state
        .db
        .set_course_cover_url(&course.id, &public_url)
        .await?
        .ok_or_else(|| AppError::NotFound(AppError::COURSE_NOT_FOUND.to_string()))?;

    tracing::info!(
        user_id = %user.id,
        course_id = %updated.id,
        key = %key,
        "Course cover updated"
    );

    Ok(Json(updated))
}
