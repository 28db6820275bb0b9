//! Event ingestion with synchronous delivery fan-out.
//!
//! Recording an event is the only write path into the `events` table. The
//! matching subscription snapshot is taken and the resulting delivery rows
//! are created before `record` returns, so a subscriber that unsubscribes a
//! moment later still receives events recorded while it was subscribed.

use relay_core::matcher::{matching_subscriptions, SubscriptionCandidate};
use relay_core::scope::EventScope;
use relay_core::types::{DbId, Timestamp};
use relay_db::models::{Delivery, Event};
use relay_db::repositories::{DeliveryRepo, EventRepo, EventTypeRepo, SubscriptionRepo};
use relay_db::DbPool;

use crate::error::EngineError;
use relay_core::error::CoreError;

/// Validated event recording and read access to the stored log.
pub struct EventIngest;

impl EventIngest {
    /// Record an event and fan out deliveries to every matching subscription.
    ///
    /// Validation failures (unknown type, scope mismatch) reject the event
    /// before anything is written. Returns the stored event together with
    /// the delivery rows created for it.
    pub async fn record(
        pool: &DbPool,
        type_name: &str,
        scope: &EventScope,
        payload: &serde_json::Value,
        max_attempts: i64,
        now: Timestamp,
    ) -> Result<(Event, Vec<Delivery>), EngineError> {
        let event_type = EventTypeRepo::find_by_name(pool, type_name)
            .await?
            .ok_or_else(|| CoreError::UnknownEventType(type_name.to_string()))?;
        scope.validate_against(&event_type.shape())?;

        let event = EventRepo::insert(pool, event_type.id, scope, payload).await?;

        // Snapshot the live subscriptions for this type and match in memory.
        let subscriptions = SubscriptionRepo::list_for_event_type(pool, event_type.id).await?;
        let candidates = subscriptions
            .iter()
            .map(|s| s.as_candidate(&event_type.name))
            .collect::<Result<Vec<SubscriptionCandidate>, _>>()?;
        let matches = matching_subscriptions(&event_type.name, scope, &candidates);

        let mut deliveries = Vec::with_capacity(matches.len());
        for candidate in matches {
            let delivery = DeliveryRepo::create(
                pool,
                event.id,
                candidate.id,
                candidate.subscriber_id,
                max_attempts,
                now,
            )
            .await?;
            deliveries.push(delivery);
        }

        tracing::info!(
            event_id = event.id,
            type_name,
            deliveries = deliveries.len(),
            "Event recorded",
        );
        Ok((event, deliveries))
    }

    /// Fetch a stored event by ID.
    pub async fn get(pool: &DbPool, id: DbId) -> Result<Event, EngineError> {
        EventRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CoreError::NotFound { entity: "Event", id }.into())
    }

    /// List recent events, newest first.
    pub async fn list(pool: &DbPool, limit: i64, offset: i64) -> Result<Vec<Event>, EngineError> {
        Ok(EventRepo::list_recent(pool, limit, offset).await?)
    }

    /// Deliveries created for one event.
    pub async fn deliveries(pool: &DbPool, event_id: DbId) -> Result<Vec<Delivery>, EngineError> {
        // 404 for a missing event rather than an empty list.
        Self::get(pool, event_id).await?;
        Ok(DeliveryRepo::list_for_event(pool, event_id).await?)
    }

    /// Retention pruning: drop events (and their deliveries) older than the
    /// cutoff. Returns the number of events removed.
    pub async fn prune_older_than(pool: &DbPool, cutoff: Timestamp) -> Result<u64, EngineError> {
        let pruned = EventRepo::delete_older_than(pool, cutoff).await?;
        if pruned > 0 {
            tracing::info!(pruned, "Pruned expired events");
        }
        Ok(pruned)
    }
}
