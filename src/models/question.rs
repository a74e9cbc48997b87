// src/models/question.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Correct answers are stored as a single option letter.
static CORRECT_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ABCD]$").expect("static regex"));

/// Upper bound for an embedded base64 image (characters).
const MAX_IMAGE_LEN: u64 = 8 * 1024 * 1024;

/// Represents the 'questions' table in the database.
///
/// Serializing this struct reveals `correct_answer`; only the detailed
/// result review uses it directly. Everything students browse goes
/// through [`PublicQuestion`].
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub test_id: i64,

    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// One of "A", "B", "C" or "D".
    pub correct_answer: String,

    /// 1-based display position within the test.
    /// Stored as `position` because `order` is reserved in SQL.
    #[serde(rename = "order")]
    pub position: i32,

    /// Base64 encoded image (usually a `data:` URL).
    pub image: Option<String>,
}

/// DTO for sending a question to students (excludes the correct answer).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    #[serde(rename = "order")]
    pub position: i32,
    pub image: Option<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            option_a: q.option_a,
            option_b: q.option_b,
            option_c: q.option_c,
            option_d: q.option_d,
            position: q.position,
            image: q.image,
        }
    }
}

/// DTO for one question inside a create-test request.
/// Field names follow the authoring form (`optionA`, `correct`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 5000, message = "Question text is required."))]
    pub text: String,

    #[serde(rename = "optionA")]
    #[validate(length(min = 1, max = 255, message = "Option A is required."))]
    pub option_a: String,

    #[serde(rename = "optionB")]
    #[validate(length(min = 1, max = 255, message = "Option B is required."))]
    pub option_b: String,

    #[serde(rename = "optionC")]
    #[validate(length(min = 1, max = 255, message = "Option C is required."))]
    pub option_c: String,

    #[serde(rename = "optionD")]
    #[validate(length(min = 1, max = 255, message = "Option D is required."))]
    pub option_d: String,

    #[validate(regex(path = *CORRECT_OPTION_RE, message = "Correct answer must be one of A, B, C or D."))]
    pub correct: String,

    #[validate(length(max = MAX_IMAGE_LEN))]
    pub image: Option<String>,
}

/// A question ready to be persisted (sanitised, position assigned).
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub position: i32,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(correct: &str) -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: "Capital of France?".to_string(),
            option_a: "Berlin".to_string(),
            option_b: "Paris".to_string(),
            option_c: "Rome".to_string(),
            option_d: "Madrid".to_string(),
            correct: correct.to_string(),
            image: None,
        }
    }

    #[test]
    fn accepts_option_letters() {
        for letter in ["A", "B", "C", "D"] {
            assert!(request(letter).validate().is_ok(), "{letter} should be valid");
        }
    }

    #[test]
    fn rejects_other_answers() {
        for bad in ["", "E", "b", "AB", "Paris"] {
            assert!(request(bad).validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rejects_missing_option() {
        let mut req = request("A");
        req.option_c = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn public_question_hides_answer() {
        let q = Question {
            id: 7,
            test_id: 1,
            question_text: "Q".into(),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_answer: "C".into(),
            position: 1,
            image: None,
        };

        let json = serde_json::to_value(PublicQuestion::from(q)).unwrap();
        assert!(json.get("correct_answer").is_none());
        assert_eq!(json["order"], 1);
    }
}
