//! Background delivery engine.
//!
//! Worker tasks poll for due deliveries, claim them one at a time with a
//! conditional UPDATE, dispatch through the configured transport, and record
//! the outcome. A separate sweeper task reclaims rows whose worker died
//! mid-dispatch, giving at-least-once semantics.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use relay_core::backoff::{
    retry_delay, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
};
use relay_db::models::Delivery;
use relay_db::repositories::{DeliveryRepo, EventRepo, EventTypeRepo, SubscriberRepo, SubscriptionRepo};
use relay_db::DbPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::registry::{CANCEL_SUBSCRIBER_REMOVED, CANCEL_SUBSCRIPTION_REMOVED};
use crate::transport::{Dispatcher, EventEnvelope, Outcome, SubscriberSpec};

/// Tuning knobs for the delivery engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent worker tasks.
    pub worker_count: usize,
    /// How often each worker polls for due deliveries.
    pub poll_interval: Duration,
    /// How long a claim may be held before the sweeper reclaims it.
    pub lease_timeout: Duration,
    /// Retry budget stamped onto newly created deliveries.
    pub max_attempts: i64,
    /// Exponential backoff base delay.
    pub base_delay: Duration,
    /// Exponential backoff cap.
    pub max_delay: Duration,
    /// Due deliveries fetched per poll cycle.
    pub batch_size: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            poll_interval: Duration::from_secs(1),
            lease_timeout: Duration::from_secs(60),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            batch_size: 32,
        }
    }
}

/// Claims due deliveries and pushes them through the dispatcher.
pub struct DeliveryEngine {
    pool: DbPool,
    dispatcher: Arc<dyn Dispatcher>,
    config: EngineConfig,
}

impl DeliveryEngine {
    pub fn new(pool: DbPool, dispatcher: Arc<dyn Dispatcher>, config: EngineConfig) -> Self {
        Self {
            pool,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Spawn the worker and sweeper tasks.
    ///
    /// All tasks run until the token is cancelled; the returned handles let
    /// the caller await a clean shutdown.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.config.worker_count + 1);
        for worker_id in 0..self.config.worker_count {
            let engine = Arc::clone(self);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                engine.run_worker(worker_id, cancel).await;
            }));
        }
        let engine = Arc::clone(self);
        handles.push(tokio::spawn(async move {
            engine.run_lease_sweeper(cancel).await;
        }));
        handles
    }

    /// One worker loop: poll, claim, dispatch, repeat.
    async fn run_worker(&self, worker_id: usize, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        tracing::info!(worker_id, "Delivery worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(worker_id, "Delivery worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.process_due_once().await {
                        tracing::error!(worker_id, error = %e, "Delivery cycle failed");
                    }
                }
            }
        }
    }

    /// The sweeper loop: reclaim expired leases on every lease interval.
    async fn run_lease_sweeper(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.lease_timeout);
        tracing::info!("Lease sweeper started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Lease sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_expired_leases().await {
                        tracing::error!(error = %e, "Lease sweep failed");
                    }
                }
            }
        }
    }

    /// One poll cycle: claim and process every currently due delivery.
    ///
    /// Returns the number of deliveries processed. Also the deterministic
    /// entry point for tests, which drive cycles directly instead of
    /// waiting on the poll interval.
    pub async fn process_due_once(&self) -> Result<usize, EngineError> {
        let due = DeliveryRepo::list_due(&self.pool, Utc::now(), self.config.batch_size).await?;
        let mut processed = 0;
        for candidate in due {
            // The claim can lose to a sibling worker; that is not an error.
            let Some(claimed) = DeliveryRepo::claim(&self.pool, candidate.id, Utc::now()).await?
            else {
                continue;
            };
            self.process_claimed(claimed).await?;
            processed += 1;
        }
        Ok(processed)
    }

    /// Reclaim `delivering` rows whose lease expired. Returns the count.
    pub async fn sweep_expired_leases(&self) -> Result<u64, EngineError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.config.lease_timeout)
                .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let reclaimed = DeliveryRepo::reclaim_expired_leases(&self.pool, cutoff, Utc::now()).await?;
        if reclaimed > 0 {
            tracing::warn!(reclaimed, "Reclaimed expired delivery leases");
        }
        Ok(reclaimed)
    }

    /// Dispatch one claimed delivery and record its outcome.
    async fn process_claimed(&self, delivery: Delivery) -> Result<(), EngineError> {
        // The subscription or subscriber may have been removed between claim
        // and dispatch; such rows can never succeed.
        if SubscriptionRepo::find_by_id(&self.pool, delivery.subscription_id)
            .await?
            .is_none()
        {
            return self
                .record_permanent(&delivery, delivery.attempt_count, CANCEL_SUBSCRIPTION_REMOVED)
                .await;
        }
        let Some(subscriber) = SubscriberRepo::find_by_id(&self.pool, delivery.subscriber_id).await?
        else {
            return self
                .record_permanent(&delivery, delivery.attempt_count, CANCEL_SUBSCRIBER_REMOVED)
                .await;
        };

        let spec = match SubscriberSpec::from_row(&subscriber) {
            Ok(spec) => spec,
            Err(reason) => {
                return self
                    .record_permanent(&delivery, delivery.attempt_count, &reason)
                    .await;
            }
        };

        let envelope = match self.build_envelope(&delivery).await? {
            Some(envelope) => envelope,
            None => {
                // The event row was pruned under the delivery.
                return self
                    .record_permanent(&delivery, delivery.attempt_count, "event removed")
                    .await;
            }
        };

        let attempt = delivery.attempt_count + 1;
        let outcome = self.dispatcher.dispatch(&spec, &envelope).await;
        match outcome {
            Outcome::Success { status_code } => {
                DeliveryRepo::mark_delivered(&self.pool, delivery.id, attempt, status_code, Utc::now())
                    .await?;
                tracing::info!(
                    delivery_id = delivery.id,
                    event_id = delivery.event_id,
                    attempt,
                    "Delivery succeeded",
                );
            }
            Outcome::Permanent { reason } => {
                self.record_permanent(&delivery, attempt, &reason).await?;
            }
            Outcome::Transient { reason } => {
                if attempt >= delivery.max_attempts {
                    let reason = format!("{reason} (retry budget exhausted)");
                    self.record_permanent(&delivery, attempt, &reason).await?;
                } else {
                    let delay = retry_delay(attempt, self.config.base_delay, self.config.max_delay);
                    let next_attempt_at = Utc::now()
                        + chrono::Duration::from_std(delay)
                            .unwrap_or_else(|_| chrono::Duration::seconds(60));
                    DeliveryRepo::mark_retryable(
                        &self.pool,
                        delivery.id,
                        attempt,
                        next_attempt_at,
                        &reason,
                        Utc::now(),
                    )
                    .await?;
                    tracing::warn!(
                        delivery_id = delivery.id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason,
                        "Delivery attempt failed, retry scheduled",
                    );
                }
            }
        }
        Ok(())
    }

    async fn record_permanent(
        &self,
        delivery: &Delivery,
        attempt: i64,
        reason: &str,
    ) -> Result<(), EngineError> {
        DeliveryRepo::mark_failed_permanent(&self.pool, delivery.id, attempt, reason, Utc::now())
            .await?;
        tracing::warn!(
            delivery_id = delivery.id,
            event_id = delivery.event_id,
            attempt,
            reason,
            "Delivery failed permanently",
        );
        Ok(())
    }

    /// Resolve the delivery's event row into the wire envelope.
    async fn build_envelope(&self, delivery: &Delivery) -> Result<Option<EventEnvelope>, EngineError> {
        let Some(event) = EventRepo::find_by_id(&self.pool, delivery.event_id).await? else {
            return Ok(None);
        };
        let Some(event_type) = EventTypeRepo::find_by_id(&self.pool, event.event_type_id).await?
        else {
            return Ok(None);
        };
        Ok(Some(EventEnvelope {
            event_id: event.id,
            event_type: event_type.name,
            timestamp: event.created_at,
            scope: event.scope(),
            payload: event.payload,
        }))
    }
}
