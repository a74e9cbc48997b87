// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    grading::{assemble_detail, score},
    models::test_result::{NewTestResult, SubmitTestRequest},
    state::DynStore,
    utils::{
        json::AppJson,
        jwt::{Claims, Role},
    },
};

/// Submits a student's answers for a test.
///
/// * Student only.
/// * Scores with +4 / -1 negative marking; only questions marked `answered` count.
/// * Every submission is stored as a new result, earlier attempts are kept.
pub async fn submit_test(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.require(Role::Student, "Only students can submit tests")?;

    let test = store
        .find_test(req.test_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;
    let questions = store.list_questions(test.test.id).await?;

    let outcome = score(
        &questions,
        test.test.passing_marks,
        &req.answers,
        &req.question_status,
    );

    let result = store
        .insert_result(NewTestResult {
            student_id,
            test_id: test.test.id,
            answers: req.answers,
            question_status: req.question_status,
            marked_for_review: req.marked_for_review,
            outcome,
        })
        .await?;

    tracing::info!(
        "Student {} submitted test {}: {}/{} ({}%)",
        student_id,
        test.test.id,
        outcome.marks_obtained,
        outcome.max_marks,
        outcome.percentage
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Test submitted successfully",
            "result": result
        })),
    ))
}

/// Lists the calling student's own results, newest first.
pub async fn list_my_results(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.require(Role::Student, "Only students can access their results")?;

    let results = store.list_results_by_student(student_id).await?;

    Ok(Json(results))
}

/// Retrieves one result with the per-question review.
///
/// Students may read their own results; teachers the results of their own tests.
/// The payload includes correct answers.
pub async fn get_result(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let caller_id = claims.account_id()?;

    let result = store
        .find_result(id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    let test = store
        .find_test(result.result.test_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let allowed = match claims.role {
        Role::Student => result.result.student_id == caller_id,
        Role::Teacher => test.test.teacher_id == caller_id,
    };
    if !allowed {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }

    let questions = store.list_questions(test.test.id).await?;

    Ok(Json(assemble_detail(&result, &test, &questions)))
}

/// Lists all results of one student.
/// Students may only ask for themselves; teachers for anyone.
pub async fn list_student_results(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(student_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role == Role::Student && claims.account_id()? != student_id {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }

    let results = store.list_results_by_student(student_id).await?;

    Ok(Json(results))
}
