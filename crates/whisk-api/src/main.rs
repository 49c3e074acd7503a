//! whisk-api - HTTP API server for Whisk

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use whisk_api::{auth, build_router, middleware::build_limiter, ApiConfig, AppState};
use whisk_core::{GenerationBackend, NoteRepository, RecipeRepository};
use whisk_db::{Database, MemoryStore};
use whisk_import::HttpFetcher;
use whisk_inference::{backend_from_env, InferenceProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "whisk_api=debug,whisk_import=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("whisk-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ApiConfig::from_env()?;

    match config.rate_limit {
        Some(limit) => info!(
            requests = limit.requests,
            period_secs = limit.period_secs,
            "Rate limiting enabled"
        ),
        None => info!("Rate limiting disabled"),
    }

    let (recipes, notes): (Arc<dyn RecipeRepository>, Arc<dyn NoteRepository>) =
        if config.uses_memory_store() {
            info!("Using in-memory store; data is lost on restart");
            let store = MemoryStore::new();
            (Arc::new(store.recipes()), Arc::new(store.notes()))
        } else {
            info!("Connecting to database...");
            let db = Database::connect(&config.database_url).await?;
            info!("Database connected");

            info!("Running database migrations...");
            db.migrate().await?;
            info!("Database migrations complete");

            (Arc::new(db.recipes.clone()), Arc::new(db.notes.clone()))
        };

    let backend = backend_from_env(InferenceProvider::from_env()?)?;
    info!(model = backend.model_name(), "Inference backend initialized");

    let fetcher = Arc::new(HttpFetcher::from_env()?);
    let verifier = auth::verifier_from_config(&config.auth)?;

    let state = AppState::new(recipes, notes, fetcher, backend, verifier)
        .with_rate_limiter(config.rate_limit.and_then(build_limiter));

    let app = build_router(state, &config);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
