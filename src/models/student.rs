// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,

    /// Unique login. Not necessarily a mail address (seeded accounts use roll ids).
    pub email: String,

    #[serde(skip)]
    pub password_hash: String,

    pub name: Option<String>,

    pub roll_number: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub roll_number: Option<String>,
}

/// DTO for student login.
#[derive(Debug, Deserialize, Validate)]
pub struct StudentLoginRequest {
    #[validate(length(min = 1, max = 255, message = "Missing credentials"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Missing credentials"))]
    pub password: String,
}
