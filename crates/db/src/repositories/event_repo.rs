//! Repository for the append-only `events` table.

use relay_core::scope::EventScope;
use relay_core::types::{DbId, Timestamp};

use crate::models::event::Event;
use crate::DbPool;

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "\
    id, event_type_id, project_uuid, pipeline_uuid, job_uuid, run_uuid, \
    build_uuid, environment_uuid, payload, created_at";

/// Read/write operations for stored events.
///
/// There is deliberately no update or delete here beyond retention pruning;
/// events are immutable facts.
pub struct EventRepo;

impl EventRepo {
    /// Append a new event row.
    pub async fn insert(
        pool: &DbPool,
        event_type_id: DbId,
        scope: &EventScope,
        payload: &serde_json::Value,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                 (event_type_id, project_uuid, pipeline_uuid, job_uuid, run_uuid, \
                  build_uuid, environment_uuid, payload) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(event_type_id)
            .bind(scope.project_uuid.as_deref())
            .bind(scope.pipeline_uuid.as_deref())
            .bind(scope.job_uuid.as_deref())
            .bind(scope.run_uuid.as_deref())
            .bind(scope.build_uuid.as_deref())
            .bind(scope.environment_uuid.as_deref())
            .bind(payload)
            .fetch_one(pool)
            .await
    }

    /// Find an event by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List recent events newest-first.
    pub async fn list_recent(
        pool: &DbPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query =
            format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id DESC LIMIT ? OFFSET ?");
        sqlx::query_as::<_, Event>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Retention pruning: delete events created before the cutoff.
    ///
    /// Cascades to their deliveries. Housekeeping only; not part of the
    /// ingestion contract.
    pub async fn delete_older_than(pool: &DbPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE created_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
