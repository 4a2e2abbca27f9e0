//! Database layer (Supabase PostgREST).

pub mod postgrest;

pub use postgrest::PostgrestDb;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const TEACHERS: &str = "teachers";
    pub const COURSES: &str = "courses";
    /// Lessons (keyed by id, owned by `course_id`)
    pub const COURSE_LESSONS: &str = "course_lessons";
}
