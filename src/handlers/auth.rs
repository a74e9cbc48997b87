// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        student::{NewStudent, StudentLoginRequest},
        teacher::TeacherLoginRequest,
    },
    state::DynStore,
    utils::{
        hash::{hash_password, verify_password},
        json::AppJson,
        jwt::{Role, sign_jwt},
    },
};

/// Authenticates a teacher and returns a JWT token.
///
/// Teacher accounts are provisioned out of band (see `seed_teacher` in main);
/// there is no self sign-up.
pub async fn teacher_login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    AppJson(payload): AppJson<TeacherLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let teacher = store
        .find_teacher_by_login(&payload.teacher_id)
        .await?
        .ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &teacher.password_hash)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let token = sign_jwt(teacher.id, Role::Teacher, &config.jwt_secret, config.jwt_expiration)?;
    tracing::info!("Teacher {} logged in", teacher.id);

    Ok(Json(json!({
        "message": "Login successful",
        "access_token": token,
        "user": teacher
    })))
}

/// Authenticates a student and returns a JWT token.
///
/// * Known email + right password: logs in.
/// * Known email + wrong password: 401.
/// * Unknown email: creates the account on the spot when auto-registration is on.
pub async fn student_login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    AppJson(payload): AppJson<StudentLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (student, message) = match store.find_student_by_email(&payload.email).await? {
        Some(student) => {
            if !verify_password(&payload.password, &student.password_hash)? {
                return Err(AppError::AuthError("Invalid credentials".to_string()));
            }
            (student, "Login successful")
        }
        None if config.student_auto_register => {
            let student = store
                .create_student(NewStudent {
                    email: payload.email.clone(),
                    password_hash: hash_password(&payload.password)?,
                    name: Some(payload.email.clone()),
                    roll_number: None,
                })
                .await?;
            tracing::info!("Registered student {} on first login", student.id);
            (student, "Account created and logged in")
        }
        None => return Err(AppError::AuthError("Invalid credentials".to_string())),
    };

    let token = sign_jwt(student.id, Role::Student, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "message": message,
        "access_token": token,
        "user": student
    })))
}
