use lms_backend::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    storage::{MediaState, MediaStore, S3MediaStore},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point. Brings up the components in dependency order:
/// configuration, logging, Postgres (with migrations), object storage, then the HTTP
/// server. Any failure before the listener is bound aborts the process.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    // A missing .env file is fine; real environment variables take precedence anyway.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise crate debug plus request traces.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lms_backend=debug,tower_http=info".into());

    // 3. Output format follows APP_ENV.
    match config.env {
        // LOCAL: multi-line pretty output for reading in a terminal.
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        // PROD: one JSON object per line for log collectors.
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3a. Login timing: the unknown-email path verifies against this hash.
    lms_backend::auth::password::init_dummy_hash()
        .expect("FATAL: Failed to initialize the login dummy hash.");

    // 4. Database (Postgres)
    // A small pool: handlers hold a connection only for the duration of one query.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    // Schema lives in ./migrations and is embedded at compile time.
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to run database migrations.");

    // Behind the trait object so tests can swap in the in-memory repository.
    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Object storage (S3/MinIO)
    // Credentials and endpoint were resolved by AppConfig for the current environment.
    let media_store = S3MediaStore::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    )
    .await;

    // LOCAL-ONLY: MinIO in docker starts without buckets.
    if config.env == Env::Local {
        media_store.ensure_bucket_exists().await;
    }

    let media = Arc::new(media_store) as MediaState;

    // 6. Unified state
    // Bundles the backends and config shared by every request.
    let port = config.port;
    let app_state = AppState {
        repo,
        media,
        config,
    };

    // 7. Router and server startup
    let app = create_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: Failed to bind HTTP listener.");

    tracing::info!("Listening on {}", addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{}/swagger-ui", port);

    // Runs until the process is stopped.
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}
