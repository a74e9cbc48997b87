// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions, types::Json};

use crate::{
    error::AppError,
    models::{
        question::Question,
        student::{NewStudent, Student},
        teacher::{NewTeacher, Teacher},
        test::{NewTest, Test, TestSummary, UpdateTestRequest},
        test_result::{NewTestResult, ResultView},
    },
    store::Store,
};

const MAX_CONNECT_RETRIES: u32 = 5;

const TEST_SUMMARY_SELECT: &str = r#"
    SELECT
        t.id, t.teacher_id, t.name, t.description, t.duration,
        t.passing_marks, t.is_active, t.created_at,
        (SELECT COUNT(*) FROM questions q WHERE q.test_id = t.id) AS question_count
    FROM tests t
"#;

const RESULT_COLUMNS: &str = r#"
    SELECT
        r.id, r.student_id, r.test_id,
        r.answers, r.question_status, r.marked_for_review,
        r.marks_obtained, r.max_marks, r.percentage,
        r.correct_count, r.wrong_count, r.unanswered_count,
        r.is_passed, r.submitted_at,
        t.name AS test_name,
        t.passing_marks,
        s.email AS student_email,
        r.marks_obtained AS score
"#;

const RESULT_JOINS: &str = r#"
    JOIN tests t ON t.id = r.test_id
    JOIN students s ON s.id = r.student_id
"#;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with a few retries; the database container is often still
    /// starting when the service boots.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut retry_count = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(Self::new(pool)),
                Err(e) => {
                    retry_count += 1;
                    if retry_count > MAX_CONNECT_RETRIES {
                        return Err(e);
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_teacher_by_login(&self, login_id: &str) -> Result<Option<Teacher>, AppError> {
        let teacher = sqlx::query_as::<_, Teacher>(
            r#"
            SELECT id, login_id, password_hash, name, email, created_at
            FROM teachers
            WHERE login_id = $1
            "#,
        )
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(teacher)
    }

    async fn create_teacher(&self, teacher: NewTeacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            r#"
            INSERT INTO teachers (login_id, password_hash, name, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, login_id, password_hash, name, email, created_at
            "#,
        )
        .bind(&teacher.login_id)
        .bind(&teacher.password_hash)
        .bind(&teacher.name)
        .bind(&teacher.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::Conflict(format!("Teacher '{}' already exists", teacher.login_id))
            } else {
                tracing::error!("Failed to create teacher: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, email, password_hash, name, roll_number, created_at
            FROM students
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (email, password_hash, name, roll_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, name, roll_number, created_at
            "#,
        )
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(&student.name)
        .bind(&student.roll_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::Conflict(format!("Student '{}' already exists", student.email))
            } else {
                tracing::error!("Failed to create student: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn create_test(&self, teacher_id: i64, test: NewTest) -> Result<TestSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (teacher_id, name, description, duration, passing_marks)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, teacher_id, name, description, duration, passing_marks, is_active, created_at
            "#,
        )
        .bind(teacher_id)
        .bind(&test.name)
        .bind(&test.description)
        .bind(test.duration)
        .bind(test.passing_marks)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert test: {:?}", e);
            AppError::from(e)
        })?;

        for question in &test.questions {
            sqlx::query(
                r#"
                INSERT INTO questions
                (test_id, question_text, option_a, option_b, option_c, option_d, correct_answer, position, image)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(created.id)
            .bind(&question.question_text)
            .bind(&question.option_a)
            .bind(&question.option_b)
            .bind(&question.option_c)
            .bind(&question.option_d)
            .bind(&question.correct_answer)
            .bind(question.position)
            .bind(&question.image)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert question {}: {:?}", question.position, e);
                AppError::from(e)
            })?;
        }

        tx.commit().await?;

        Ok(TestSummary {
            test: created,
            question_count: test.questions.len() as i64,
        })
    }

    async fn list_tests_by_teacher(&self, teacher_id: i64) -> Result<Vec<TestSummary>, AppError> {
        let sql = format!("{TEST_SUMMARY_SELECT} WHERE t.teacher_id = $1 ORDER BY t.id");
        let tests = sqlx::query_as::<_, TestSummary>(&sql)
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tests)
    }

    async fn list_active_tests(&self) -> Result<Vec<TestSummary>, AppError> {
        let sql = format!("{TEST_SUMMARY_SELECT} WHERE t.is_active ORDER BY t.id");
        let tests = sqlx::query_as::<_, TestSummary>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(tests)
    }

    async fn find_test(&self, id: i64) -> Result<Option<TestSummary>, AppError> {
        let sql = format!("{TEST_SUMMARY_SELECT} WHERE t.id = $1");
        let test = sqlx::query_as::<_, TestSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(test)
    }

    async fn list_questions(&self, test_id: i64) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id, test_id, question_text,
                option_a, option_b, option_c, option_d,
                correct_answer, position, image
            FROM questions
            WHERE test_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn update_test(
        &self,
        id: i64,
        changes: UpdateTestRequest,
    ) -> Result<Option<TestSummary>, AppError> {
        if changes.is_empty() {
            return self.find_test(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tests SET ");
        let mut separated = builder.separated(", ");

        if let Some(name) = changes.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(description) = changes.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }

        if let Some(duration) = changes.duration {
            separated.push("duration = ");
            separated.push_bind_unseparated(duration);
        }

        if let Some(passing_marks) = changes.passing_marks {
            separated.push("passing_marks = ");
            separated.push_bind_unseparated(passing_marks);
        }

        if let Some(is_active) = changes.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to update test: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_test(id).await
    }

    async fn delete_test(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete test: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_result(&self, result: NewTestResult) -> Result<ResultView, AppError> {
        // Insert and join in one statement so the row is never observed half-written.
        let sql = format!(
            r#"
            WITH r AS (
                INSERT INTO test_results
                (student_id, test_id, answers, question_status, marked_for_review,
                 marks_obtained, max_marks, percentage,
                 correct_count, wrong_count, unanswered_count, is_passed)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING *
            )
            {RESULT_COLUMNS} FROM r {RESULT_JOINS}
            "#
        );

        let outcome = result.outcome;
        sqlx::query_as::<_, ResultView>(&sql)
            .bind(result.student_id)
            .bind(result.test_id)
            .bind(Json(result.answers))
            .bind(Json(result.question_status))
            .bind(Json(result.marked_for_review))
            .bind(f64::from(outcome.marks_obtained))
            .bind(f64::from(outcome.max_marks))
            .bind(outcome.percentage)
            .bind(outcome.correct_count)
            .bind(outcome.wrong_count)
            .bind(outcome.unanswered_count)
            .bind(outcome.is_passed)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert test result: {:?}", e);
                AppError::from(e)
            })
    }

    async fn find_result(&self, id: i64) -> Result<Option<ResultView>, AppError> {
        let sql = format!("{RESULT_COLUMNS} FROM test_results r {RESULT_JOINS} WHERE r.id = $1");
        let view = sqlx::query_as::<_, ResultView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(view)
    }

    async fn list_results_by_student(&self, student_id: i64) -> Result<Vec<ResultView>, AppError> {
        let sql = format!(
            "{RESULT_COLUMNS} FROM test_results r {RESULT_JOINS} WHERE r.student_id = $1 ORDER BY r.submitted_at DESC, r.id DESC"
        );
        let results = sqlx::query_as::<_, ResultView>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(results)
    }

    async fn list_results_by_test(&self, test_id: i64) -> Result<Vec<ResultView>, AppError> {
        let sql = format!(
            "{RESULT_COLUMNS} FROM test_results r {RESULT_JOINS} WHERE r.test_id = $1 ORDER BY r.submitted_at DESC, r.id DESC"
        );
        let results = sqlx::query_as::<_, ResultView>(&sql)
            .bind(test_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(results)
    }
}
