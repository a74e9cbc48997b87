// src/grading/review.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{question::Question, test::TestSummary, test_result::ResultView};

/// The shapes `marked_for_review` has been stored in.
///
/// Older clients send a list of question ids, newer ones a map keyed by id.
/// Anything else is kept so it can be reported, but flags nothing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReviewMarks {
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
    Malformed(Value),
}

impl ReviewMarks {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => ReviewMarks::List(items.clone()),
            Value::Object(map) => ReviewMarks::Map(map.clone()),
            other => ReviewMarks::Malformed(other.clone()),
        }
    }

    /// Normalizes to the set of question ids (as strings) flagged for review.
    ///
    /// List entries may be strings or numbers. In map form every key counts,
    /// whatever its value.
    pub fn marked_ids(&self) -> BTreeSet<String> {
        match self {
            ReviewMarks::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            ReviewMarks::Map(map) => map.keys().cloned().collect(),
            ReviewMarks::Malformed(raw) => {
                if !raw.is_null() {
                    tracing::warn!("Ignoring malformed marked_for_review value: {}", raw);
                }
                BTreeSet::new()
            }
        }
    }
}

/// One question of a reviewed attempt: the question (with its answer key),
/// what the student picked and whether they flagged it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewedQuestion {
    #[serde(flatten)]
    pub question: Question,
    /// As submitted; `null` when the question was left alone.
    pub student_answer: Value,
    pub is_marked_for_review: bool,
}

/// Full review payload for a stored result.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedResult {
    #[serde(flatten)]
    pub result: ResultView,
    pub test: TestSummary,
    pub questions: Vec<ReviewedQuestion>,
}

/// Rebuilds the per-question view of a stored result.
///
/// Questions come out in display order. This is a pure read: assembling the
/// same result twice gives the same payload.
pub fn assemble_detail(
    result: &ResultView,
    test: &TestSummary,
    questions: &[Question],
) -> DetailedResult {
    let marked = ReviewMarks::from_value(&result.result.marked_for_review).marked_ids();
    let answers = &result.result.answers;

    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|q| (q.position, q.id));

    let questions = ordered
        .into_iter()
        .map(|q| {
            let key = q.id.to_string();
            ReviewedQuestion {
                question: q.clone(),
                student_answer: answers.get(&key).cloned().unwrap_or(Value::Null),
                is_marked_for_review: marked.contains(&key),
            }
        })
        .collect();

    DetailedResult {
        result: result.clone(),
        test: test.clone(),
        questions,
    }
}
