//! Event type catalogue service.
//!
//! Event producers and subscription management both resolve type names
//! through here. Registration is idempotent for an identical shape and
//! rejected when a name is re-registered with a different shape.

use relay_core::error::CoreError;
use relay_core::event_type::{validate_type_name, ScopeShape};
use relay_db::models::EventType;
use relay_db::repositories::EventTypeRepo;
use relay_db::DbPool;

use crate::error::EngineError;

/// The built-in catalogue registered at startup.
///
/// Producers may register additional names at runtime; this list covers the
/// platform lifecycle notifications that exist from the first boot.
pub const DEFAULT_EVENT_TYPES: &[&str] = &[
    "project:created",
    "project:updated",
    "project:deleted",
    "project:pipeline:created",
    "project:pipeline:updated",
    "project:pipeline:deleted",
    "project:pipeline:interactive-session:started",
    "project:pipeline:interactive-session:stopped",
    "project:pipeline:interactive-pipeline-run:created",
    "project:pipeline:interactive-pipeline-run:started",
    "project:pipeline:interactive-pipeline-run:cancelled",
    "project:pipeline:interactive-pipeline-run:failed",
    "project:pipeline:interactive-pipeline-run:succeeded",
    "project:one-off-job:created",
    "project:one-off-job:started",
    "project:one-off-job:deleted",
    "project:one-off-job:cancelled",
    "project:one-off-job:failed",
    "project:one-off-job:succeeded",
    "project:one-off-job:pipeline-run:created",
    "project:one-off-job:pipeline-run:started",
    "project:one-off-job:pipeline-run:cancelled",
    "project:one-off-job:pipeline-run:failed",
    "project:one-off-job:pipeline-run:succeeded",
    "project:cron-job:created",
    "project:cron-job:updated",
    "project:cron-job:deleted",
    "project:cron-job:paused",
    "project:cron-job:unpaused",
    "project:cron-job:run:started",
    "project:cron-job:run:succeeded",
    "project:cron-job:run:failed",
    "project:environment:image-build:created",
    "project:environment:image-build:started",
    "project:environment:image-build:cancelled",
    "project:environment:image-build:failed",
    "project:environment:image-build:succeeded",
];

/// Registration and lookup of event types.
pub struct EventTypeCatalog;

impl EventTypeCatalog {
    /// Register a type with the shape derived from its name hierarchy.
    ///
    /// Idempotent: re-registering an existing name is a no-op that returns
    /// the existing row.
    pub async fn register(pool: &DbPool, name: &str) -> Result<EventType, EngineError> {
        let shape = ScopeShape::for_type_name(name);
        Self::register_with_shape(pool, name, shape).await
    }

    /// Register a type with an explicitly declared shape.
    ///
    /// Re-registering with the same shape is a no-op; re-registering with a
    /// different shape is rejected, since the stored shape is immutable.
    pub async fn register_with_shape(
        pool: &DbPool,
        name: &str,
        shape: ScopeShape,
    ) -> Result<EventType, EngineError> {
        validate_type_name(name)?;

        if let Some(inserted) = EventTypeRepo::insert_ignore(pool, name, shape).await? {
            tracing::info!(type_name = name, "Event type registered");
            return Ok(inserted);
        }

        // Lost the insert race or the name predates this call; either way the
        // existing row wins, as long as its shape agrees.
        let existing = EventTypeRepo::find_by_name(pool, name)
            .await?
            .ok_or_else(|| CoreError::UnknownEventType(name.to_string()))?;
        if existing.shape() != shape {
            return Err(CoreError::DuplicateType(name.to_string()).into());
        }
        Ok(existing)
    }

    /// Look up a type by name.
    pub async fn get(pool: &DbPool, name: &str) -> Result<EventType, EngineError> {
        EventTypeRepo::find_by_name(pool, name)
            .await?
            .ok_or_else(|| CoreError::UnknownEventType(name.to_string()).into())
    }

    /// Whether a name is registered.
    pub async fn exists(pool: &DbPool, name: &str) -> Result<bool, EngineError> {
        Ok(EventTypeRepo::exists(pool, name).await?)
    }

    /// The full catalogue, name-ordered.
    pub async fn list(pool: &DbPool) -> Result<Vec<EventType>, EngineError> {
        Ok(EventTypeRepo::list(pool).await?)
    }

    /// Seed the built-in catalogue. Safe to run on every startup.
    pub async fn bootstrap(pool: &DbPool) -> Result<(), EngineError> {
        for name in DEFAULT_EVENT_TYPES {
            Self::register(pool, name).await?;
        }
        tracing::info!(count = DEFAULT_EVENT_TYPES.len(), "Event type catalogue bootstrapped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_names_are_valid() {
        for name in DEFAULT_EVENT_TYPES {
            assert!(validate_type_name(name).is_ok(), "invalid name: {name}");
        }
    }

    #[test]
    fn default_catalogue_has_no_duplicates() {
        let mut names: Vec<&str> = DEFAULT_EVENT_TYPES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_EVENT_TYPES.len());
    }
}
