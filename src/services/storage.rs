// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Object storage client (Supabase Storage).
//!
//! Handles:
//! - Upsert uploads keyed by a caller-chosen object path
//! - Public URL derivation for stored objects
//! - Object key layout for course covers and lesson content

use crate::error::AppError;
use crate::services::supabase::SupabaseClient;
use axum::body::Bytes;
use reqwest::{header, Method};

/// Key prefix for course cover images.
pub const COURSE_COVERS_PREFIX: &str = "course_covers";
/// Key prefix for lesson bodies.
pub const LESSON_CONTENT_PREFIX: &str = "lesson_content";

/// Storage key for a course's cover image, e.g. `course_covers/c1.png`.
pub fn course_cover_key(course_id: &str, ext: &str) -> String {
    format!("{}/{}.{}", COURSE_COVERS_PREFIX, course_id, ext)
}

/// Storage key for a lesson's content, e.g. `lesson_content/l1.md`.
pub fn lesson_content_key(lesson_id: &str, ext: &str) -> String {
    format!("{}/{}.{}", LESSON_CONTENT_PREFIX, lesson_id, ext)
}

/// Percent-encode each path segment, keeping the `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Client for a single storage bucket.
#[derive(Clone)]
pub struct StorageClient {
    client: SupabaseClient,
    bucket: String,
}

impl StorageClient {
    pub fn new(client: SupabaseClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload an object, overwriting any existing object at the same key.
    pub async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        let path = format!("/storage/v1/object/{}/{}", self.bucket, encode_key(key));
        let size = body.len();

        let request = self
            .client
            .request(Method::POST, &path)
            .header("x-upsert", "true")
            .header(header::CONTENT_TYPE, content_type)
            .body(body);

        self.client.send(request).await?;

        tracing::info!(
            bucket = %self.bucket,
            key = key,
            size,
            content_type,
            "Object uploaded"
        );
        Ok(())
    }

    /// Public URL for an object in this bucket.
    ///
    /// Pure derivation; it does not check that the object exists.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.client.base_url(),
            self.bucket,
            encode_key(key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_key_layout() {
        assert_eq!(lesson_content_key("l1", "md"), "lesson_content/l1.md");
        assert_eq!(course_cover_key("c1", "png"), "course_covers/c1.png");
    }

    #[test]
    fn test_public_url() {
        let config = Config::test_default("https://project.supabase.co/");
        let storage = StorageClient::new(SupabaseClient::new(&config), "images");

        assert_eq!(
            storage.public_url("lesson_content/l1.md"),
            "https://project.supabase.co/storage/v1/object/public/images/lesson_content/l1.md"
        );
    }

    #[test]
    fn test_public_url_encodes_segments() {
        let config = Config::test_default("https://project.supabase.co");
        let storage = StorageClient::new(SupabaseClient::new(&config), "images");

        assert_eq!(
            storage.public_url("course_covers/my course?.png"),
            "https://project.supabase.co/storage/v1/object/public/images/course_covers/my%20course%3F.png"
        );
    }
}
