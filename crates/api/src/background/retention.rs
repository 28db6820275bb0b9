//! Periodic pruning of old events.
//!
//! Spawns a background task that deletes events (and, by cascade, their
//! deliveries) older than the configured retention period. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use relay_db::DbPool;
use relay_engine::EventIngest;
use tokio_util::sync::CancellationToken;

/// How often the pruning job runs.
const PRUNE_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the event retention loop.
///
/// Deletes events older than `retention_days`. Runs until `cancel` is
/// triggered.
pub async fn run(pool: DbPool, retention_days: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_days,
        interval_secs = PRUNE_INTERVAL.as_secs(),
        "Event retention job started"
    );

    let mut interval = tokio::time::interval(PRUNE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Event retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match EventIngest::prune_older_than(&pool, cutoff).await {
                    Ok(pruned) => {
                        if pruned == 0 {
                            tracing::debug!("Event retention: nothing to prune");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Event retention: prune failed");
                    }
                }
            }
        }
    }
}
