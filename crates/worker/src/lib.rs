//! Scheduler edge: drives the orchestrator at a fixed interval.
//!
//! In deployment a platform cron hits the API's trigger endpoint; this
//! binary is the self-contained alternative for environments without an
//! external scheduler. Overlap between the two is harmless because both
//! paths contend on the same distributed lock.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use reelforge_pipeline::SceneProcessor;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Seconds between orchestrator invocations (default: `30`).
    pub interval_secs: u64,
    /// Maximum projects serviced per invocation (default: `10`).
    pub batch_size: i64,
    /// Lock TTL in seconds (default: `300`).
    pub lock_ttl_seconds: i64,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `PIPELINE_INTERVAL_SECS` | `30`    |
    /// | `PIPELINE_BATCH_SIZE`    | `10`    |
    /// | `PIPELINE_LOCK_TTL_SECS` | `300`   |
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("PIPELINE_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("PIPELINE_INTERVAL_SECS must be a valid u64");

        let batch_size: i64 = std::env::var("PIPELINE_BATCH_SIZE")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("PIPELINE_BATCH_SIZE must be a valid i64");

        let lock_ttl_seconds: i64 = std::env::var("PIPELINE_LOCK_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("PIPELINE_LOCK_TTL_SECS must be a valid i64");

        Self {
            interval_secs,
            batch_size,
            lock_ttl_seconds,
        }
    }
}

/// Run the orchestrator loop until the token is cancelled.
///
/// Run errors are logged and the loop continues; a transient database or
/// provider outage only costs the affected ticks.
pub async fn run(processor: Arc<SceneProcessor>, config: WorkerConfig, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Pipeline worker cancelled");
                break;
            }
            _ = interval.tick() => {
                match processor.run_once().await {
                    Ok(summary) if summary.lock_contended => {
                        tracing::debug!("Tick skipped: lock contended");
                    }
                    Ok(summary) => {
                        tracing::debug!(
                            processed = summary.processed,
                            completed = summary.completed,
                            failed = summary.failed,
                            paused = summary.paused,
                            "Tick finished",
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Pipeline run failed");
                    }
                }
            }
        }
    }
}
