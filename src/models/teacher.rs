// src/models/teacher.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'teachers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,

    /// Login identifier typed on the teacher login form.
    #[serde(rename = "teacher_id")]
    pub login_id: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub name: Option<String>,

    pub email: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub login_id: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// DTO for teacher login.
#[derive(Debug, Deserialize, Validate)]
pub struct TeacherLoginRequest {
    #[validate(length(min = 1, max = 100, message = "Missing credentials"))]
    pub teacher_id: String,
    #[validate(length(min = 1, max = 128, message = "Missing credentials"))]
    pub password: String,
}
