//! Subscriber and subscription management.
//!
//! Removal is terminal for not-yet-dispatched deliveries: the registry
//! cancels them before the row disappears, so the engine never resurrects
//! work for a consumer that opted out.

use relay_core::error::CoreError;
use relay_core::scope::SubscriptionScope;
use relay_core::types::{DbId, Timestamp};
use relay_db::models::{Subscriber, Subscription};
use relay_db::repositories::{DeliveryRepo, SubscriberRepo, SubscriptionRepo};
use relay_db::DbPool;

use crate::catalog::EventTypeCatalog;
use crate::error::EngineError;

/// Recorded on deliveries cancelled because their subscription was removed.
pub const CANCEL_SUBSCRIPTION_REMOVED: &str = "subscription removed";

/// Recorded on deliveries cancelled because their subscriber was removed.
pub const CANCEL_SUBSCRIBER_REMOVED: &str = "subscriber removed";

/// Subscriber and subscription CRUD with delivery cancellation.
pub struct SubscriptionRegistry;

impl SubscriptionRegistry {
    // ---- Subscribers ------------------------------------------------------

    /// Create a webhook subscriber.
    pub async fn create_webhook_subscriber(
        pool: &DbPool,
        name: &str,
        url: &str,
        secret: &str,
        verify_tls: bool,
    ) -> Result<Subscriber, EngineError> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Subscriber name must not be empty".into()).into());
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CoreError::Validation(format!(
                "Webhook URL '{url}' must be an http(s) URL"
            ))
            .into());
        }
        if secret.is_empty() {
            return Err(CoreError::Validation("Webhook secret must not be empty".into()).into());
        }
        let subscriber = SubscriberRepo::create_webhook(pool, name, url, secret, verify_tls).await?;
        tracing::info!(subscriber_id = subscriber.id, name, "Webhook subscriber created");
        Ok(subscriber)
    }

    /// Create an analytics subscriber.
    pub async fn create_analytics_subscriber(
        pool: &DbPool,
        name: &str,
        sink: &str,
    ) -> Result<Subscriber, EngineError> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Subscriber name must not be empty".into()).into());
        }
        if sink.trim().is_empty() {
            return Err(CoreError::Validation("Analytics sink must not be empty".into()).into());
        }
        let subscriber = SubscriberRepo::create_analytics(pool, name, sink).await?;
        tracing::info!(subscriber_id = subscriber.id, name, "Analytics subscriber created");
        Ok(subscriber)
    }

    /// Fetch a subscriber by ID.
    pub async fn get_subscriber(pool: &DbPool, id: DbId) -> Result<Subscriber, EngineError> {
        SubscriberRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CoreError::NotFound { entity: "Subscriber", id }.into())
    }

    /// List all subscribers.
    pub async fn list_subscribers(pool: &DbPool) -> Result<Vec<Subscriber>, EngineError> {
        Ok(SubscriberRepo::list(pool).await?)
    }

    /// Delete a subscriber, its subscriptions, and cancel its undispatched
    /// deliveries. Terminal delivery rows survive for audit.
    pub async fn delete_subscriber(pool: &DbPool, id: DbId, now: Timestamp) -> Result<(), EngineError> {
        let cancelled =
            DeliveryRepo::cancel_undispatched_for_subscriber(pool, id, CANCEL_SUBSCRIBER_REMOVED, now)
                .await?;
        if !SubscriberRepo::delete(pool, id).await? {
            return Err(CoreError::NotFound { entity: "Subscriber", id }.into());
        }
        tracing::info!(subscriber_id = id, cancelled, "Subscriber deleted");
        Ok(())
    }

    // ---- Subscriptions ----------------------------------------------------

    /// Subscribe a subscriber to an event type with the given scope filter.
    ///
    /// The scope's specificity must be permitted by the type's declared
    /// shape, and the (subscriber, type, scope) tuple must be new.
    pub async fn subscribe(
        pool: &DbPool,
        subscriber_id: DbId,
        type_name: &str,
        scope: SubscriptionScope,
    ) -> Result<Subscription, EngineError> {
        Self::get_subscriber(pool, subscriber_id).await?;
        let event_type = EventTypeCatalog::get(pool, type_name).await?;
        scope.validate_against(&event_type.shape())?;

        let (project_uuid, job_uuid) = scope.into_columns();
        let result = SubscriptionRepo::insert(
            pool,
            subscriber_id,
            event_type.id,
            project_uuid.as_deref(),
            job_uuid.as_deref(),
        )
        .await;

        match result {
            Ok(subscription) => {
                tracing::info!(
                    subscription_id = subscription.id,
                    subscriber_id,
                    type_name,
                    "Subscription created",
                );
                Ok(subscription)
            }
            Err(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return Err(CoreError::DuplicateSubscription {
                            subscriber_id,
                            event_type: type_name.to_string(),
                        }
                        .into());
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Fetch a subscription by ID.
    pub async fn get_subscription(pool: &DbPool, id: DbId) -> Result<Subscription, EngineError> {
        SubscriptionRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CoreError::NotFound { entity: "Subscription", id }.into())
    }

    /// A subscriber's subscriptions.
    pub async fn list_subscriptions(
        pool: &DbPool,
        subscriber_id: DbId,
    ) -> Result<Vec<Subscription>, EngineError> {
        Self::get_subscriber(pool, subscriber_id).await?;
        Ok(SubscriptionRepo::list_for_subscriber(pool, subscriber_id).await?)
    }

    /// Remove a subscription and cancel its undispatched deliveries.
    ///
    /// Idempotent: removing an already-absent subscription reports `false`
    /// rather than an error.
    pub async fn unsubscribe(pool: &DbPool, id: DbId, now: Timestamp) -> Result<bool, EngineError> {
        let cancelled =
            DeliveryRepo::cancel_undispatched_for_subscription(pool, id, CANCEL_SUBSCRIPTION_REMOVED, now)
                .await?;
        let removed = SubscriptionRepo::delete(pool, id).await?;
        if removed {
            tracing::info!(subscription_id = id, cancelled, "Subscription removed");
        }
        Ok(removed)
    }
}
