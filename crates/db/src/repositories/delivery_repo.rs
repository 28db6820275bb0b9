//! Repository for the `deliveries` table.
//!
//! The per-row state transitions here are the only place in the schema that
//! needs atomic update discipline: every transition is a single conditional
//! UPDATE guarded by the row's current status, so two workers racing on the
//! same row get exactly one winner.

use relay_core::types::{DbId, Timestamp};

use crate::models::delivery::Delivery;
use crate::DbPool;

/// Column list for `deliveries` queries.
const DELIVERY_COLUMNS: &str = "\
    id, event_id, subscription_id, subscriber_id, status, attempt_count, \
    max_attempts, next_attempt_at, claimed_at, last_error, \
    response_status_code, delivered_at, created_at, updated_at";

/// Filter for the delivery listing query surface.
#[derive(Debug, Clone, Default)]
pub struct DeliveryFilter {
    pub status: Option<String>,
    pub subscriber_id: Option<DbId>,
    pub created_from: Option<Timestamp>,
    pub created_to: Option<Timestamp>,
}

/// State-machine and query operations for deliveries.
pub struct DeliveryRepo;

impl DeliveryRepo {
    /// Create a delivery in `pending` with `attempt_count = 0`, due now.
    pub async fn create(
        pool: &DbPool,
        event_id: DbId,
        subscription_id: DbId,
        subscriber_id: DbId,
        max_attempts: i64,
        now: Timestamp,
    ) -> Result<Delivery, sqlx::Error> {
        let query = format!(
            "INSERT INTO deliveries \
                 (event_id, subscription_id, subscriber_id, max_attempts, next_attempt_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {DELIVERY_COLUMNS}"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(event_id)
            .bind(subscription_id)
            .bind(subscriber_id)
            .bind(max_attempts)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// List due deliveries: claimable rows whose `next_attempt_at` has passed.
    pub async fn list_due(
        pool: &DbPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<Delivery>, sqlx::Error> {
        let query = format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries \
             WHERE status IN ('pending', 'failed_retryable') AND next_attempt_at <= ? \
             ORDER BY next_attempt_at ASC LIMIT ?"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Atomically claim one delivery for dispatch.
    ///
    /// Moves the row to `delivering` and stamps the worker lease, but only if
    /// it is still claimable and still due. Returns `None` when another worker
    /// won the race or rescheduled the row into the future since it was
    /// listed; the loser moves on to the next candidate.
    pub async fn claim(
        pool: &DbPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!(
            "UPDATE deliveries \
             SET status = 'delivering', claimed_at = ?, updated_at = ? \
             WHERE id = ? AND status IN ('pending', 'failed_retryable') \
               AND next_attempt_at <= ? \
             RETURNING {DELIVERY_COLUMNS}"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(now)
            .bind(now)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Terminal success after positive transport acknowledgement.
    pub async fn mark_delivered(
        pool: &DbPool,
        id: DbId,
        attempt_count: i64,
        response_status_code: Option<i64>,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE deliveries \
             SET status = 'delivered', attempt_count = ?, response_status_code = ?, \
                 delivered_at = ?, claimed_at = NULL, last_error = NULL, updated_at = ? \
             WHERE id = ? AND status = 'delivering'",
        )
        .bind(attempt_count)
        .bind(response_status_code)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transient failure with retry budget remaining: schedule the next try.
    pub async fn mark_retryable(
        pool: &DbPool,
        id: DbId,
        attempt_count: i64,
        next_attempt_at: Timestamp,
        last_error: &str,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE deliveries \
             SET status = 'failed_retryable', attempt_count = ?, next_attempt_at = ?, \
                 last_error = ?, claimed_at = NULL, updated_at = ? \
             WHERE id = ? AND status = 'delivering'",
        )
        .bind(attempt_count)
        .bind(next_attempt_at)
        .bind(last_error)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal failure: permanent rejection or exhausted retry budget.
    pub async fn mark_failed_permanent(
        pool: &DbPool,
        id: DbId,
        attempt_count: i64,
        last_error: &str,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE deliveries \
             SET status = 'failed_permanent', attempt_count = ?, last_error = ?, \
                 claimed_at = NULL, updated_at = ? \
             WHERE id = ? AND status = 'delivering'",
        )
        .bind(attempt_count)
        .bind(last_error)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminally cancel a subscription's not-yet-dispatched deliveries.
    ///
    /// `delivering` rows are left alone: an in-flight dispatch finishes
    /// naturally and its outcome is still recorded for audit.
    pub async fn cancel_undispatched_for_subscription(
        pool: &DbPool,
        subscription_id: DbId,
        reason: &str,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE deliveries \
             SET status = 'failed_permanent', last_error = ?, updated_at = ? \
             WHERE subscription_id = ? AND status IN ('pending', 'failed_retryable')",
        )
        .bind(reason)
        .bind(now)
        .bind(subscription_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Terminally cancel every undispatched delivery for a subscriber.
    pub async fn cancel_undispatched_for_subscriber(
        pool: &DbPool,
        subscriber_id: DbId,
        reason: &str,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE deliveries \
             SET status = 'failed_permanent', last_error = ?, updated_at = ? \
             WHERE subscriber_id = ? AND status IN ('pending', 'failed_retryable')",
        )
        .bind(reason)
        .bind(now)
        .bind(subscriber_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Crash recovery sweep: reset `delivering` rows whose lease expired.
    ///
    /// The attempt may or may not have gone out before the worker died, so
    /// the row goes back to `pending` for a re-attempt (at-least-once).
    pub async fn reclaim_expired_leases(
        pool: &DbPool,
        claimed_before: Timestamp,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE deliveries \
             SET status = 'pending', claimed_at = NULL, next_attempt_at = ?, updated_at = ? \
             WHERE status = 'delivering' AND claimed_at <= ?",
        )
        .bind(now)
        .bind(now)
        .bind(claimed_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find a delivery by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!("SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The status-query path: one delivery by its (event, subscription) pair.
    pub async fn find_by_event_and_subscription(
        pool: &DbPool,
        event_id: DbId,
        subscription_id: DbId,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries \
             WHERE event_id = ? AND subscription_id = ?"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(event_id)
            .bind(subscription_id)
            .fetch_optional(pool)
            .await
    }

    /// List all deliveries for one event.
    pub async fn list_for_event(
        pool: &DbPool,
        event_id: DbId,
    ) -> Result<Vec<Delivery>, sqlx::Error> {
        let query =
            format!("SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE event_id = ? ORDER BY id");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Filtered listing for the audit/query surface.
    pub async fn list_filtered(
        pool: &DbPool,
        filter: &DeliveryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delivery>, sqlx::Error> {
        let mut query = format!("SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE 1 = 1");
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filter.subscriber_id.is_some() {
            query.push_str(" AND subscriber_id = ?");
        }
        if filter.created_from.is_some() {
            query.push_str(" AND created_at >= ?");
        }
        if filter.created_to.is_some() {
            query.push_str(" AND created_at <= ?");
        }
        query.push_str(" ORDER BY id DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, Delivery>(&query);
        if let Some(status) = &filter.status {
            q = q.bind(status);
        }
        if let Some(subscriber_id) = filter.subscriber_id {
            q = q.bind(subscriber_id);
        }
        if let Some(from) = filter.created_from {
            q = q.bind(from);
        }
        if let Some(to) = filter.created_to {
            q = q.bind(to);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}
