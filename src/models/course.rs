// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Course and lesson rows.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat a JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Course row (`courses` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Owning teacher (auth user ID)
    pub teacher_id: String,
    /// Public URL of the cover image, refreshed on every cover upload
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub learning_goals: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_public: bool,
}

impl Course {
    /// Ownership check: only the course's teacher may mutate it.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.teacher_id == user_id
    }
}

/// Lesson row (`course_lessons` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseLesson {
    pub id: String,
    pub course_id: String,
    /// Public URL of the lesson content, refreshed on every content upload
    #[serde(default)]
    pub item_link: Option<String>,
}
