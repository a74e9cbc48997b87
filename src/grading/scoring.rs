// src/grading/scoring.rs

use serde::Serialize;
use serde_json::Value;

use crate::{
    config::{MARKS_PER_CORRECT, PENALTY_PER_WRONG},
    models::{
        question::Question,
        test_result::{AnswerSheet, QuestionStatus, StatusSheet},
    },
};

/// Aggregates computed for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub correct_count: i32,
    pub wrong_count: i32,
    pub unanswered_count: i32,
    pub marks_obtained: i32,
    pub max_marks: i32,
    /// Rounded to two decimal places.
    pub percentage: f64,
    pub is_passed: bool,
}

/// Scores a submission against a test's questions.
///
/// * Only questions with status `answered` and a non-null answer are scored.
/// * A correct answer is an exact string match with the stored letter; any
///   other answer, including one that is not a string, is wrong.
/// * Statuses that are not a known string count as unattempted.
/// * +4 per correct, -1 per wrong, total floored at zero.
/// * `passing_marks` is a percentage; meeting it exactly passes.
///
/// Answers for ids that are not part of the test are ignored.
pub fn score(
    questions: &[Question],
    passing_marks: i32,
    answers: &AnswerSheet,
    statuses: &StatusSheet,
) -> ScoreOutcome {
    let mut correct_count = 0;
    let mut wrong_count = 0;
    let mut unanswered_count = 0;

    for question in questions {
        let key = question.id.to_string();
        let status = statuses.get(&key).and_then(QuestionStatus::from_value);
        let answer = answers.get(&key).filter(|a| !a.is_null());

        match (status, answer) {
            (Some(QuestionStatus::Answered), Some(Value::String(given)))
                if *given == question.correct_answer =>
            {
                correct_count += 1;
            }
            (Some(QuestionStatus::Answered), Some(_)) => wrong_count += 1,
            _ => unanswered_count += 1,
        }
    }

    let marks_obtained = (correct_count * MARKS_PER_CORRECT - wrong_count * PENALTY_PER_WRONG).max(0);
    let max_marks = questions.len() as i32 * MARKS_PER_CORRECT;

    let raw_percentage = if max_marks > 0 {
        f64::from(marks_obtained) / f64::from(max_marks) * 100.0
    } else {
        0.0
    };

    ScoreOutcome {
        correct_count,
        wrong_count,
        unanswered_count,
        marks_obtained,
        max_marks,
        percentage: round2(raw_percentage),
        is_passed: raw_percentage >= f64::from(passing_marks),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: i64, correct: &str) -> Question {
        Question {
            id,
            test_id: 1,
            question_text: format!("Question {}", id),
            option_a: "A".into(),
            option_b: "B".into(),
            option_c: "C".into(),
            option_d: "D".into(),
            correct_answer: correct.into(),
            position: id as i32,
            image: None,
        }
    }

    fn sheets(
        entries: &[(i64, Option<&str>, Option<QuestionStatus>)],
    ) -> (AnswerSheet, StatusSheet) {
        let mut answers = AnswerSheet::new();
        let mut statuses = StatusSheet::new();
        for (id, answer, status) in entries {
            answers.insert(id.to_string(), answer.map_or(Value::Null, Value::from));
            statuses.insert(
                id.to_string(),
                status.map_or(Value::Null, |s| serde_json::to_value(s).unwrap()),
            );
        }
        (answers, statuses)
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let questions = vec![question(1, "B"), question(2, "C")];
        let (answers, statuses) = sheets(&[
            (1, Some("B"), Some(QuestionStatus::Answered)),
            (2, Some("C"), Some(QuestionStatus::Answered)),
        ]);

        let outcome = score(&questions, 60, &answers, &statuses);

        assert_eq!(outcome.correct_count, 2);
        assert_eq!(outcome.wrong_count, 0);
        assert_eq!(outcome.unanswered_count, 0);
        assert_eq!(outcome.marks_obtained, 8);
        assert_eq!(outcome.max_marks, 8);
        assert_eq!(outcome.percentage, 100.0);
        assert!(outcome.is_passed);
    }

    #[test]
    fn negative_marks_floor_at_zero() {
        let questions = vec![question(1, "B"), question(2, "C")];
        let (answers, statuses) = sheets(&[
            (1, Some("A"), Some(QuestionStatus::Answered)),
            (2, None, Some(QuestionStatus::Skipped)),
        ]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.correct_count, 0);
        assert_eq!(outcome.wrong_count, 1);
        assert_eq!(outcome.unanswered_count, 1);
        assert_eq!(outcome.marks_obtained, 0);
        assert_eq!(outcome.percentage, 0.0);
        assert!(!outcome.is_passed);
    }

    #[test]
    fn empty_test_does_not_divide_by_zero() {
        let outcome = score(&[], 40, &AnswerSheet::new(), &StatusSheet::new());

        assert_eq!(outcome.max_marks, 0);
        assert_eq!(outcome.marks_obtained, 0);
        assert_eq!(outcome.percentage, 0.0);
        assert!(!outcome.is_passed);
    }

    #[test]
    fn empty_test_passes_a_zero_threshold() {
        let outcome = score(&[], 0, &AnswerSheet::new(), &StatusSheet::new());
        assert!(outcome.is_passed);
    }

    #[test]
    fn only_answered_status_is_scored() {
        let questions = vec![
            question(1, "A"),
            question(2, "A"),
            question(3, "A"),
            question(4, "A"),
            question(5, "A"),
        ];
        // Every question carries the right letter, but only one is marked answered.
        let (answers, statuses) = sheets(&[
            (1, Some("A"), Some(QuestionStatus::Answered)),
            (2, Some("A"), Some(QuestionStatus::Skipped)),
            (3, Some("A"), Some(QuestionStatus::MarkedOnly)),
            (4, Some("A"), Some(QuestionStatus::Unrecognized)),
            (5, Some("A"), None),
        ]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.unanswered_count, 4);
        assert_eq!(outcome.marks_obtained, 4);
        assert_eq!(outcome.max_marks, 20);
        assert_eq!(outcome.percentage, 20.0);
    }

    #[test]
    fn answered_without_value_is_unanswered() {
        let questions = vec![question(1, "A")];
        let (answers, statuses) = sheets(&[(1, None, Some(QuestionStatus::Answered))]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.unanswered_count, 1);
        assert_eq!(outcome.wrong_count, 0);
    }

    #[test]
    fn non_string_answer_is_wrong() {
        let questions = vec![question(1, "A"), question(2, "A")];
        let answers = AnswerSheet::from([("1".into(), json!(1)), ("2".into(), json!(["A"]))]);
        let statuses = StatusSheet::from([
            ("1".into(), json!("answered")),
            ("2".into(), json!("answered")),
        ]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.wrong_count, 2);
        assert_eq!(outcome.marks_obtained, 0);
    }

    #[test]
    fn non_string_status_is_unattempted() {
        let questions = vec![question(1, "A"), question(2, "A"), question(3, "A")];
        let answers = AnswerSheet::from([
            ("1".into(), json!("A")),
            ("2".into(), json!("A")),
            ("3".into(), json!("A")),
        ]);
        let statuses = StatusSheet::from([
            ("1".into(), json!(true)),
            ("2".into(), json!(7)),
            ("3".into(), json!("later")),
        ]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.unanswered_count, 3);
        assert_eq!(outcome.correct_count, 0);
        assert_eq!(outcome.wrong_count, 0);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let questions = vec![question(1, "B")];
        let (answers, statuses) = sheets(&[(1, Some("b"), Some(QuestionStatus::Answered))]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.wrong_count, 1);
    }

    #[test]
    fn meeting_threshold_exactly_passes() {
        // 1 of 2 correct, 1 skipped -> 4 / 8 = 50%.
        let questions = vec![question(1, "A"), question(2, "B")];
        let (answers, statuses) = sheets(&[(1, Some("A"), Some(QuestionStatus::Answered))]);

        assert!(score(&questions, 50, &answers, &statuses).is_passed);
        assert!(!score(&questions, 51, &answers, &statuses).is_passed);
    }

    #[test]
    fn percentage_is_rounded_to_two_places() {
        // 1 correct of 3 -> 4 / 12 = 33.333...%
        let questions = vec![question(1, "A"), question(2, "B"), question(3, "C")];
        let (answers, statuses) = sheets(&[(1, Some("A"), Some(QuestionStatus::Answered))]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.percentage, 33.33);
    }

    #[test]
    fn answers_outside_the_test_are_ignored() {
        let questions = vec![question(1, "A")];
        let (answers, statuses) = sheets(&[
            (1, Some("A"), Some(QuestionStatus::Answered)),
            (99, Some("D"), Some(QuestionStatus::Answered)),
        ]);

        let outcome = score(&questions, 40, &answers, &statuses);

        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.wrong_count, 0);
    }

    #[test]
    fn aggregates_hold_for_every_small_submission() {
        let letters = [None, Some("A"), Some("B")];
        let states = [
            None,
            Some(QuestionStatus::Answered),
            Some(QuestionStatus::Skipped),
            Some(QuestionStatus::MarkedOnly),
        ];
        let questions = vec![question(1, "A"), question(2, "A"), question(3, "A")];

        // Each question independently takes one of 12 (letter, status) pairs.
        let choices: Vec<_> = letters
            .iter()
            .flat_map(|l| states.iter().map(move |s| (*l, *s)))
            .collect();

        for a in &choices {
            for b in &choices {
                for c in &choices {
                    let (answers, statuses) =
                        sheets(&[(1, a.0, a.1), (2, b.0, b.1), (3, c.0, c.1)]);
                    let outcome = score(&questions, 50, &answers, &statuses);

                    assert_eq!(
                        outcome.correct_count + outcome.wrong_count + outcome.unanswered_count,
                        3
                    );
                    assert!(outcome.marks_obtained >= 0);
                    assert!(outcome.marks_obtained <= outcome.max_marks);
                    assert!(outcome.marks_obtained <= outcome.correct_count * MARKS_PER_CORRECT);
                    assert!((0.0..=100.0).contains(&outcome.percentage));
                }
            }
        }
    }
}
