// src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        question::Question,
        student::{NewStudent, Student},
        teacher::{NewTeacher, Teacher},
        test::{NewTest, Test, TestSummary, UpdateTestRequest},
        test_result::{NewTestResult, ResultView, TestResult},
    },
    store::Store,
};

/// In-process store for local runs without Postgres and for HTTP tests.
/// Mirrors the relational behaviour: per-table ids, inner joins, cascades.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    tests: Vec<Test>,
    questions: Vec<Question>,
    results: Vec<TestResult>,
    last_teacher_id: i64,
    last_student_id: i64,
    last_test_id: i64,
    last_question_id: i64,
    last_result_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn summary(&self, test: &Test) -> TestSummary {
        TestSummary {
            test: test.clone(),
            question_count: self.questions.iter().filter(|q| q.test_id == test.id).count() as i64,
        }
    }

    /// Inner join of a result with its test and student.
    fn view(&self, result: &TestResult) -> Option<ResultView> {
        let test = self.tests.iter().find(|t| t.id == result.test_id)?;
        let student = self.students.iter().find(|s| s.id == result.student_id)?;
        Some(ResultView {
            result: result.clone(),
            test_name: test.name.clone(),
            passing_marks: test.passing_marks,
            student_email: student.email.clone(),
            score: result.marks_obtained,
        })
    }

    /// Newest first, like the SQL backend.
    fn views<F>(&self, keep: F) -> Vec<ResultView>
    where
        F: Fn(&TestResult) -> bool,
    {
        let mut views: Vec<ResultView> = self
            .results
            .iter()
            .filter(|r| keep(r))
            .filter_map(|r| self.view(r))
            .collect();
        views.sort_by(|a, b| {
            (b.result.submitted_at, b.result.id).cmp(&(a.result.submitted_at, a.result.id))
        });
        views
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_teacher_by_login(&self, login_id: &str) -> Result<Option<Teacher>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables.teachers.iter().find(|t| t.login_id == login_id).cloned())
    }

    async fn create_teacher(&self, teacher: NewTeacher) -> Result<Teacher, AppError> {
        let mut tables = self.inner.write().await;
        if tables.teachers.iter().any(|t| t.login_id == teacher.login_id) {
            return Err(AppError::Conflict(format!(
                "Teacher '{}' already exists",
                teacher.login_id
            )));
        }

        let created = Teacher {
            id: next_id(&mut tables.last_teacher_id),
            login_id: teacher.login_id,
            password_hash: teacher.password_hash,
            name: teacher.name,
            email: teacher.email,
            created_at: Utc::now(),
        };
        tables.teachers.push(created.clone());
        Ok(created)
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables.students.iter().find(|s| s.email == email).cloned())
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError> {
        let mut tables = self.inner.write().await;
        if tables.students.iter().any(|s| s.email == student.email) {
            return Err(AppError::Conflict(format!(
                "Student '{}' already exists",
                student.email
            )));
        }

        let created = Student {
            id: next_id(&mut tables.last_student_id),
            email: student.email,
            password_hash: student.password_hash,
            name: student.name,
            roll_number: student.roll_number,
            created_at: Utc::now(),
        };
        tables.students.push(created.clone());
        Ok(created)
    }

    async fn create_test(&self, teacher_id: i64, test: NewTest) -> Result<TestSummary, AppError> {
        let mut tables = self.inner.write().await;
        if !tables.teachers.iter().any(|t| t.id == teacher_id) {
            return Err(AppError::NotFound("Teacher not found".to_string()));
        }

        let created = Test {
            id: next_id(&mut tables.last_test_id),
            teacher_id,
            name: test.name,
            description: test.description,
            duration: test.duration,
            passing_marks: test.passing_marks,
            is_active: true,
            created_at: Utc::now(),
        };

        for question in test.questions {
            let id = next_id(&mut tables.last_question_id);
            tables.questions.push(Question {
                id,
                test_id: created.id,
                question_text: question.question_text,
                option_a: question.option_a,
                option_b: question.option_b,
                option_c: question.option_c,
                option_d: question.option_d,
                correct_answer: question.correct_answer,
                position: question.position,
                image: question.image,
            });
        }

        tables.tests.push(created.clone());
        Ok(tables.summary(&created))
    }

    async fn list_tests_by_teacher(&self, teacher_id: i64) -> Result<Vec<TestSummary>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables
            .tests
            .iter()
            .filter(|t| t.teacher_id == teacher_id)
            .map(|t| tables.summary(t))
            .collect())
    }

    async fn list_active_tests(&self) -> Result<Vec<TestSummary>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables
            .tests
            .iter()
            .filter(|t| t.is_active)
            .map(|t| tables.summary(t))
            .collect())
    }

    async fn find_test(&self, id: i64) -> Result<Option<TestSummary>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables.tests.iter().find(|t| t.id == id).map(|t| tables.summary(t)))
    }

    async fn list_questions(&self, test_id: i64) -> Result<Vec<Question>, AppError> {
        let tables = self.inner.read().await;
        let mut questions: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| q.test_id == test_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.position, q.id));
        Ok(questions)
    }

    async fn update_test(
        &self,
        id: i64,
        changes: UpdateTestRequest,
    ) -> Result<Option<TestSummary>, AppError> {
        let mut tables = self.inner.write().await;
        let Some(test) = tables.tests.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            test.name = name;
        }
        if let Some(description) = changes.description {
            test.description = Some(description);
        }
        if let Some(duration) = changes.duration {
            test.duration = duration;
        }
        if let Some(passing_marks) = changes.passing_marks {
            test.passing_marks = passing_marks;
        }
        if let Some(is_active) = changes.is_active {
            test.is_active = is_active;
        }

        let updated = test.clone();
        Ok(Some(tables.summary(&updated)))
    }

    async fn delete_test(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.inner.write().await;
        let before = tables.tests.len();
        tables.tests.retain(|t| t.id != id);
        if tables.tests.len() == before {
            return Ok(false);
        }

        tables.questions.retain(|q| q.test_id != id);
        tables.results.retain(|r| r.test_id != id);
        Ok(true)
    }

    async fn insert_result(&self, result: NewTestResult) -> Result<ResultView, AppError> {
        let mut tables = self.inner.write().await;
        let outcome = result.outcome;

        let row = TestResult {
            id: next_id(&mut tables.last_result_id),
            student_id: result.student_id,
            test_id: result.test_id,
            answers: Json(result.answers),
            question_status: Json(result.question_status),
            marked_for_review: Json(result.marked_for_review),
            marks_obtained: f64::from(outcome.marks_obtained),
            max_marks: f64::from(outcome.max_marks),
            percentage: outcome.percentage,
            correct_count: outcome.correct_count,
            wrong_count: outcome.wrong_count,
            unanswered_count: outcome.unanswered_count,
            is_passed: outcome.is_passed,
            submitted_at: Utc::now(),
        };

        // Same failure the foreign keys would raise.
        let view = tables
            .view(&row)
            .ok_or_else(|| AppError::NotFound("Test or student not found".to_string()))?;
        tables.results.push(row);
        Ok(view)
    }

    async fn find_result(&self, id: i64) -> Result<Option<ResultView>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables
            .results
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| tables.view(r)))
    }

    async fn list_results_by_student(&self, student_id: i64) -> Result<Vec<ResultView>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables.views(|r| r.student_id == student_id))
    }

    async fn list_results_by_test(&self, test_id: i64) -> Result<Vec<ResultView>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables.views(|r| r.test_id == test_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::score;
    use crate::models::{
        question::NewQuestion,
        test_result::{AnswerSheet, StatusSheet},
    };

    async fn seeded() -> (MemoryStore, i64, i64) {
        let store = MemoryStore::new();
        let teacher = store
            .create_teacher(NewTeacher {
                login_id: "nano123".into(),
                password_hash: "x".into(),
                name: None,
                email: None,
            })
            .await
            .unwrap();
        let student = store
            .create_student(NewStudent {
                email: "nano1".into(),
                password_hash: "x".into(),
                name: None,
                roll_number: None,
            })
            .await
            .unwrap();
        (store, teacher.id, student.id)
    }

    fn new_test(questions: usize) -> NewTest {
        NewTest {
            name: "Quiz".into(),
            description: None,
            duration: 30,
            passing_marks: 40,
            questions: (1..=questions)
                .map(|i| NewQuestion {
                    question_text: format!("Q{}", i),
                    option_a: "a".into(),
                    option_b: "b".into(),
                    option_c: "c".into(),
                    option_d: "d".into(),
                    correct_answer: "A".into(),
                    position: i as i32,
                    image: None,
                })
                .collect(),
        }
    }

    async fn submit(store: &MemoryStore, student_id: i64, test_id: i64) -> ResultView {
        let questions = store.list_questions(test_id).await.unwrap();
        let outcome = score(&questions, 40, &AnswerSheet::new(), &StatusSheet::new());
        store
            .insert_result(NewTestResult {
                student_id,
                test_id,
                answers: AnswerSheet::new(),
                question_status: StatusSheet::new(),
                marked_for_review: serde_json::json!([]),
                outcome,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_student_is_a_conflict() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_student(NewStudent {
                email: "nano1".into(),
                password_hash: "y".into(),
                name: None,
                roll_number: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn resubmission_appends() {
        let (store, teacher_id, student_id) = seeded().await;
        let test = store.create_test(teacher_id, new_test(2)).await.unwrap();
        assert_eq!(test.question_count, 2);

        let first = submit(&store, student_id, test.test.id).await;
        let second = submit(&store, student_id, test.test.id).await;

        assert_ne!(first.result.id, second.result.id);
        assert_eq!(store.list_results_by_student(student_id).await.unwrap().len(), 2);
        assert_eq!(store.list_results_by_test(test.test.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_cascades_to_questions_and_results() {
        let (store, teacher_id, student_id) = seeded().await;
        let test = store.create_test(teacher_id, new_test(3)).await.unwrap();
        let result = submit(&store, student_id, test.test.id).await;

        assert!(store.delete_test(test.test.id).await.unwrap());
        assert!(!store.delete_test(test.test.id).await.unwrap());
        assert!(store.list_questions(test.test.id).await.unwrap().is_empty());
        assert!(store.find_result(result.result.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let (store, teacher_id, _) = seeded().await;
        let test = store.create_test(teacher_id, new_test(1)).await.unwrap();

        let updated = store
            .update_test(
                test.test.id,
                UpdateTestRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(!updated.test.is_active);
        assert_eq!(updated.test.name, "Quiz");
        assert!(store.list_active_tests().await.unwrap().is_empty());
        assert!(store.update_test(999, UpdateTestRequest::default()).await.unwrap().is_none());
    }
}
