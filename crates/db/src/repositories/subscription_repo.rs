//! Repository for the `subscriptions` table.

use relay_core::types::DbId;

use crate::models::subscription::Subscription;
use crate::DbPool;

/// Column list for `subscriptions` queries.
const SUBSCRIPTION_COLUMNS: &str =
    "id, subscriber_id, event_type_id, project_uuid, job_uuid, created_at";

/// CRUD and matcher read-path operations for subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert a new subscription.
    ///
    /// A duplicate (subscriber, type, scope) tuple surfaces as a sqlx
    /// unique-violation; the registry service maps it to the domain error.
    pub async fn insert(
        pool: &DbPool,
        subscriber_id: DbId,
        event_type_id: DbId,
        project_uuid: Option<&str>,
        job_uuid: Option<&str>,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (subscriber_id, event_type_id, project_uuid, job_uuid) \
             VALUES (?, ?, ?, ?) \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(subscriber_id)
            .bind(event_type_id)
            .bind(project_uuid)
            .bind(job_uuid)
            .fetch_one(pool)
            .await
    }

    /// Find a subscription by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = ?");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The matcher's read path: all subscriptions for one event type.
    ///
    /// A plain query against the live table, so it reflects every
    /// subscribe/unsubscribe that returned before this call.
    pub async fn list_for_event_type(
        pool: &DbPool,
        event_type_id: DbId,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE event_type_id = ? ORDER BY id"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(event_type_id)
            .fetch_all(pool)
            .await
    }

    /// List a subscriber's subscriptions.
    pub async fn list_for_subscriber(
        pool: &DbPool,
        subscriber_id: DbId,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE subscriber_id = ? ORDER BY id"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(subscriber_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a subscription. Returns `false` if already absent.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
