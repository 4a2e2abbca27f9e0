// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod course;
pub mod user;

pub use course::{Course, CourseLesson};
pub use user::{AuthUser, Profile, Session, Teacher};
