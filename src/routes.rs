// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, health, results, tests},
    state::AppState,
    utils::jwt::auth_middleware,
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Public routes: health, API info, logins.
/// * Everything else sits behind `auth_middleware`; role checks happen in handlers.
/// * Applies global middleware (Trace, CORS, body limit).
/// * Serves the static frontend for unmatched paths when configured.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/", get(health::api_info))
        .route("/api/auth/teacher-login", post(auth::teacher_login))
        .route("/api/auth/student-login", post(auth::student_login));

    let protected_routes = Router::new()
        .route("/api/tests", get(tests::list_tests).post(tests::create_test))
        .route(
            "/api/tests/{id}",
            get(tests::get_test)
                .put(tests::update_test)
                .delete(tests::delete_test),
        )
        .route("/api/tests/{id}/results", get(tests::list_test_results))
        .route("/api/results", get(results::list_my_results))
        .route("/api/results/submit", post(results::submit_test))
        .route("/api/submit-test", post(results::submit_test))
        .route("/api/results/{id}", get(results::get_result))
        .route(
            "/api/students/{id}/results",
            get(results::list_student_results),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let mut app = Router::new().merge(public_routes).merge(protected_routes);

    if let Some(dir) = &state.config.frontend_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    let max_body_bytes = state.config.max_body_bytes;
    let cors = cors_layer(&state.config.cors_origins);

    app.layer(DefaultBodyLimit::max(max_body_bytes))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
