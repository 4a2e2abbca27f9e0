// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgREST client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Courses (ownership lookups, cover URL updates)
//! - Course lessons (lookups scoped to a course, content link updates)
//! - Profiles and teachers (lookups for the signed-in user)

use crate::db::tables;
use crate::error::AppError;
use crate::models::{AuthUser, Course, CourseLesson, Profile, Teacher};
use crate::services::supabase::SupabaseClient;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// PostgREST database client.
#[derive(Clone)]
pub struct PostgrestDb {
    client: SupabaseClient,
}

/// Build PostgREST equality filters (`col=eq.value`).
fn eq_filters(filters: &[(&str, &str)]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(column, value)| (column.to_string(), format!("eq.{}", value)))
        .collect()
}

impl PostgrestDb {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Select the first row matching every equality filter.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<T>, AppError> {
        let request = self
            .client
            .request(Method::GET, &format!("/rest/v1/{}", table))
            .query(&[("select", "*"), ("limit", "1")])
            .query(&eq_filters(filters));

        let rows: Vec<T> = self.client.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    /// Update the row with the given `id`, returning it as stored afterwards.
    ///
    /// Returns `None` when no row matched.
    pub async fn update_by_id<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        id: &str,
        fields: &B,
    ) -> Result<Option<T>, AppError> {
        let request = self
            .client
            .request(Method::PATCH, &format!("/rest/v1/{}", table))
            .query(&eq_filters(&[("id", id)]))
            .header("Prefer", "return=representation")
            .json(fields);

        let rows: Vec<T> = self.client.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    // ─── Course Operations ───────────────────────────────────────

    /// Get a course by ID.
    pub async fn get_course(&self, course_id: &str) -> Result<Option<Course>, AppError> {
        self.select_one(tables::COURSES, &[("id", course_id)]).await
    }

    /// Point the course's cover at a new public URL.
    pub async fn set_course_cover_url(
        &self,
        course_id: &str,
        cover_url: &str,
    ) -> Result<Option<Course>, AppError> {
        self.update_by_id(
            tables::COURSES,
            course_id,
            &serde_json::json!({ "cover_url": cover_url }),
        )
        .await
    }

    // ─── Lesson Operations ───────────────────────────────────────

    /// Get a lesson, but only if it belongs to the given course.
    pub async fn get_course_lesson(
        &self,
        lesson_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseLesson>, AppError> {
        self.select_one(
            tables::COURSE_LESSONS,
            &[("id", lesson_id), ("course_id", course_id)],
        )
        .await
    }

    /// Point the lesson's content link at a new public URL.
    pub async fn set_lesson_item_link(
        &self,
        lesson_id: &str,
        item_link: &str,
    ) -> Result<Option<CourseLesson>, AppError> {
        self.update_by_id(
            tables::COURSE_LESSONS,
            lesson_id,
            &serde_json::json!({ "item_link": item_link }),
        )
        .await
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Profile of the signed-in user; `None` when signed out or missing.
    pub async fn get_profile(&self, user: Option<&AuthUser>) -> Result<Option<Profile>, AppError> {
        match user {
            Some(user) => self.select_one(tables::PROFILES, &[("id", user.id.as_str())]).await,
            None => Ok(None),
        }
    }

    /// Teacher record of the signed-in user; `None` when signed out or missing.
    pub async fn get_teacher(&self, user: Option<&AuthUser>) -> Result<Option<Teacher>, AppError> {
        match user {
            Some(user) => self.select_one(tables::TEACHERS, &[("id", user.id.as_str())]).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filters() {
        let filters = eq_filters(&[("id", "l1"), ("course_id", "c1")]);
        assert_eq!(
            filters,
            vec![
                ("id".to_string(), "eq.l1".to_string()),
                ("course_id".to_string(), "eq.c1".to_string()),
            ]
        );
    }
}
