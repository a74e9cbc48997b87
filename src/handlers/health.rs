// src/handlers/health.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "message": "MCQ Test Platform Backend"
    }))
}

/// Lists the API surface.
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": "MCQ Test Platform Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": ["/api/auth/teacher-login", "/api/auth/student-login"],
            "tests": ["/api/tests", "/api/tests/{id}", "/api/tests/{id}/results"],
            "results": [
                "/api/results/submit",
                "/api/results",
                "/api/results/{id}",
                "/api/students/{id}/results"
            ]
        }
    }))
}
