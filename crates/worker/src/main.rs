use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelforge_pipeline::SceneProcessor;
use reelforge_provider::{HttpGenerationProvider, HttpMediaStorage, ProviderConfig};
use reelforge_worker::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelforge_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        interval_secs = config.interval_secs,
        batch_size = config.batch_size,
        lock_ttl_seconds = config.lock_ttl_seconds,
        "Loaded worker configuration",
    );

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = reelforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    reelforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let provider_config = ProviderConfig::from_env();
    let provider = Arc::new(HttpGenerationProvider::new(
        provider_config.generation_url.clone(),
        provider_config.generation_api_key.clone(),
    ));
    let storage = Arc::new(HttpMediaStorage::new(provider_config.storage_url.clone()));

    let processor = Arc::new(
        SceneProcessor::new(pool, provider, storage)
            .with_limits(config.batch_size, config.lock_ttl_seconds),
    );

    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let loop_handle = tokio::spawn(reelforge_worker::run(processor, config, loop_cancel));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
    cancel.cancel();

    if let Err(e) = loop_handle.await {
        tracing::error!(error = %e, "Worker loop panicked");
    }
    tracing::info!("Worker stopped");
}
