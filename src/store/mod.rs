// src/store/mod.rs

//! Persistence boundary. Handlers only ever see `dyn Store`, so the
//! Postgres and in-memory backends are interchangeable.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        question::Question,
        student::{NewStudent, Student},
        teacher::{NewTeacher, Teacher},
        test::{NewTest, TestSummary, UpdateTestRequest},
        test_result::{NewTestResult, ResultView},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_teacher_by_login(&self, login_id: &str) -> Result<Option<Teacher>, AppError>;

    async fn create_teacher(&self, teacher: NewTeacher) -> Result<Teacher, AppError>;

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;

    /// Fails with `Conflict` if the email is taken.
    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError>;

    /// Inserts a test and all of its questions atomically.
    async fn create_test(&self, teacher_id: i64, test: NewTest) -> Result<TestSummary, AppError>;

    async fn list_tests_by_teacher(&self, teacher_id: i64) -> Result<Vec<TestSummary>, AppError>;

    async fn list_active_tests(&self) -> Result<Vec<TestSummary>, AppError>;

    async fn find_test(&self, id: i64) -> Result<Option<TestSummary>, AppError>;

    /// Questions of a test in display order.
    async fn list_questions(&self, test_id: i64) -> Result<Vec<Question>, AppError>;

    /// Applies the present fields. `None` if the test does not exist.
    async fn update_test(
        &self,
        id: i64,
        changes: UpdateTestRequest,
    ) -> Result<Option<TestSummary>, AppError>;

    /// Deletes a test with its questions and results. `false` if it did not exist.
    async fn delete_test(&self, id: i64) -> Result<bool, AppError>;

    /// Appends a scored attempt. Earlier attempts are kept.
    async fn insert_result(&self, result: NewTestResult) -> Result<ResultView, AppError>;

    async fn find_result(&self, id: i64) -> Result<Option<ResultView>, AppError>;

    async fn list_results_by_student(&self, student_id: i64) -> Result<Vec<ResultView>, AppError>;

    async fn list_results_by_test(&self, test_id: i64) -> Result<Vec<ResultView>, AppError>;
}
