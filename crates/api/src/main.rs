use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelforge_api::{build_app_router, AppState, ServerConfig};
use reelforge_pipeline::SceneProcessor;
use reelforge_provider::{HttpGenerationProvider, HttpMediaStorage, ProviderConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = reelforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    reelforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- External clients ---
    let provider_config = ProviderConfig::from_env();
    let provider = Arc::new(HttpGenerationProvider::new(
        provider_config.generation_url.clone(),
        provider_config.generation_api_key.clone(),
    ));
    let storage = Arc::new(HttpMediaStorage::new(provider_config.storage_url.clone()));

    // --- Orchestrator ---
    let processor = Arc::new(SceneProcessor::new(pool.clone(), provider, storage));

    // --- App state and router ---
    let state = AppState {
        pool,
        processor,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .expect("Invalid HOST/PORT address");
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Resolve on ctrl-c so `axum::serve` can drain in-flight requests.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
}
