//! Repository for the `subscribers` table.

use relay_core::types::DbId;

use crate::models::subscriber::Subscriber;
use crate::DbPool;

/// Column list for `subscribers` queries.
const SUBSCRIBER_COLUMNS: &str =
    "id, kind, name, url, secret, verify_tls, sink, created_at, updated_at";

/// CRUD operations for subscribers.
pub struct SubscriberRepo;

impl SubscriberRepo {
    /// Create a webhook subscriber.
    pub async fn create_webhook(
        pool: &DbPool,
        name: &str,
        url: &str,
        secret: &str,
        verify_tls: bool,
    ) -> Result<Subscriber, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscribers (kind, name, url, secret, verify_tls) \
             VALUES ('webhook', ?, ?, ?, ?) \
             RETURNING {SUBSCRIBER_COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(name)
            .bind(url)
            .bind(secret)
            .bind(verify_tls)
            .fetch_one(pool)
            .await
    }

    /// Create an analytics subscriber.
    pub async fn create_analytics(
        pool: &DbPool,
        name: &str,
        sink: &str,
    ) -> Result<Subscriber, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscribers (kind, name, sink) \
             VALUES ('analytics', ?, ?) \
             RETURNING {SUBSCRIBER_COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(name)
            .bind(sink)
            .fetch_one(pool)
            .await
    }

    /// Find a subscriber by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE id = ?");
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all subscribers ordered by creation (newest first).
    pub async fn list(pool: &DbPool) -> Result<Vec<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers ORDER BY id DESC");
        sqlx::query_as::<_, Subscriber>(&query).fetch_all(pool).await
    }

    /// Delete a subscriber. Cascade deletes its subscriptions.
    ///
    /// Returns `false` if no row existed (idempotent from the caller's view).
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
