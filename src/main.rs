// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use mcq_backend::config::Config;
use mcq_backend::error::AppError;
use mcq_backend::models::teacher::NewTeacher;
use mcq_backend::routes;
use mcq_backend::state::{AppState, DynStore};
use mcq_backend::store::{MemoryStore, PgStore};
use mcq_backend::utils::hash::hash_password;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: DynStore = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            tracing::info!("Database connected...");

            tracing::info!("Running migrations...");
            store.migrate().await?;
            tracing::info!("Migrations applied successfully.");

            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on restart.");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(e) = seed_teacher(&store, &config).await {
        tracing::error!("Failed to seed teacher account: {:?}", e);
    }

    let state = AppState {
        store,
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Creates the configured teacher account if it does not exist yet.
async fn seed_teacher(store: &DynStore, config: &Config) -> Result<(), AppError> {
    let (Some(login_id), Some(password)) = (&config.teacher_login_id, &config.teacher_password)
    else {
        tracing::warn!("TEACHER_LOGIN_ID/TEACHER_PASSWORD not set; no teacher can log in.");
        return Ok(());
    };

    if store.find_teacher_by_login(login_id).await?.is_none() {
        tracing::info!("Seeding teacher account: {}", login_id);
        store
            .create_teacher(NewTeacher {
                login_id: login_id.clone(),
                password_hash: hash_password(password)?,
                name: Some("Teacher".to_string()),
                email: None,
            })
            .await?;
        tracing::info!("Teacher account created successfully.");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
