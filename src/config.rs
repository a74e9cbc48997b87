// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Marks awarded for a correct answer.
pub const MARKS_PER_CORRECT: i32 = 4;

/// Marks deducted for a wrong answer.
pub const PENALTY_PER_WRONG: i32 = 1;

/// Test duration (minutes) used when a teacher omits it.
pub const DEFAULT_TEST_DURATION: i32 = 30;

/// Passing threshold (percentage) used when a teacher omits it.
pub const DEFAULT_PASSING_MARKS: i32 = 40;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    /// Teacher account seeded at startup.
    pub teacher_login_id: Option<String>,
    pub teacher_password: Option<String>,
    /// Unknown student emails get an account on first login.
    pub student_auto_register: bool,
    /// Static frontend served for non-API paths.
    pub frontend_dir: Option<String>,
    /// Request body cap. Questions carry base64 images, so this is well above axum's default.
    pub max_body_bytes: usize,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let student_auto_register = env::var("STUDENT_AUTO_REGISTER")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            teacher_login_id: env::var("TEACHER_LOGIN_ID").ok(),
            teacher_password: env::var("TEACHER_PASSWORD").ok(),
            student_auto_register,
            frontend_dir: env::var("FRONTEND_DIR").ok(),
            max_body_bytes,
            cors_origins,
        }
    }
}
