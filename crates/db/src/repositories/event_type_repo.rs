//! Repository for the `event_types` catalogue table.

use relay_core::event_type::ScopeShape;
use relay_core::types::DbId;

use crate::models::event::EventType;
use crate::DbPool;

/// Column list for `event_types` queries.
const EVENT_TYPE_COLUMNS: &str = "\
    id, name, scope_project, scope_pipeline, scope_job, scope_run, \
    scope_build, scope_environment, created_at";

/// Read/write operations for the event type catalogue.
pub struct EventTypeRepo;

impl EventTypeRepo {
    /// Find an event type by its colon-delimited name.
    pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE name = ?");
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new event type, returning `None` when the name already exists.
    ///
    /// Conflict handling lives in SQL so concurrent bootstrap calls racing on
    /// the same name cannot fail; exactly one inserts, the rest observe the
    /// existing row via [`find_by_name`](Self::find_by_name).
    pub async fn insert_ignore(
        pool: &DbPool,
        name: &str,
        shape: ScopeShape,
    ) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_types \
                 (name, scope_project, scope_pipeline, scope_job, scope_run, \
                  scope_build, scope_environment) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (name) DO NOTHING \
             RETURNING {EVENT_TYPE_COLUMNS}"
        );
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .bind(shape.project)
            .bind(shape.pipeline)
            .bind(shape.job)
            .bind(shape.run)
            .bind(shape.build)
            .bind(shape.environment)
            .fetch_optional(pool)
            .await
    }

    /// Find an event type by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE id = ?");
        sqlx::query_as::<_, EventType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the given name is registered.
    pub async fn exists(pool: &DbPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM event_types WHERE name = ?)")
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// List the full catalogue ordered by name.
    pub async fn list(pool: &DbPool) -> Result<Vec<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types ORDER BY name");
        sqlx::query_as::<_, EventType>(&query).fetch_all(pool).await
    }
}
