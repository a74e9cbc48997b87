// src/utils/json.rs

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with rejections rendered as the usual `{"message": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
