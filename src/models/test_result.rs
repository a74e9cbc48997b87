// src/models/test_result.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, types::Json};

use crate::grading::scoring::ScoreOutcome;

/// Question id (as string) -> the answer exactly as the client sent it.
/// Normally an option letter or null; anything else is kept and scored as wrong.
pub type AnswerSheet = HashMap<String, Value>;

/// Question id (as string) -> the status exactly as the client sent it.
/// Read through `QuestionStatus::from_value`.
pub type StatusSheet = HashMap<String, Value>;

/// How a student left a question when submitting.
/// Only `Answered` questions are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Answered,
    Skipped,
    MarkedOnly,
    /// Anything the client sends that we do not know about.
    #[serde(other)]
    Unrecognized,
}

impl QuestionStatus {
    /// Interprets a raw status entry. `null` is no status at all; any other
    /// value that is not a known status string is `Unrecognized`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            other => Some(Self::deserialize(other).unwrap_or(Self::Unrecognized)),
        }
    }
}

/// Represents the 'test_results' table in the database.
/// Rows are written once at submission time and never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestResult {
    pub id: i64,
    pub student_id: i64,
    pub test_id: i64,

    /// Raw submission, kept for the detailed review.
    #[serde(skip)]
    pub answers: Json<AnswerSheet>,
    #[serde(skip)]
    pub question_status: Json<StatusSheet>,
    /// Stored exactly as submitted: a list of ids or a map keyed by id.
    #[serde(skip)]
    pub marked_for_review: Json<Value>,

    pub marks_obtained: f64,
    pub max_marks: f64,
    pub percentage: f64,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub unanswered_count: i32,
    pub is_passed: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// A result joined with its test and student, as returned by every result endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResultView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub result: TestResult,
    pub test_name: String,
    pub passing_marks: i32,
    pub student_email: String,
    /// Same value as `marks_obtained`; older clients read this name.
    pub score: f64,
}

/// DTO for submitting a test attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    pub test_id: i64,
    #[serde(default)]
    pub answers: AnswerSheet,
    #[serde(default)]
    pub question_status: StatusSheet,
    #[serde(default = "empty_review_marks")]
    pub marked_for_review: Value,
}

fn empty_review_marks() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A scored attempt ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewTestResult {
    pub student_id: i64,
    pub test_id: i64,
    pub answers: AnswerSheet,
    pub question_status: StatusSheet,
    pub marked_for_review: Value,
    pub outcome: ScoreOutcome,
}
