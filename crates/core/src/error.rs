use crate::types::DbId;

/// Domain-level error taxonomy for the event bus.
///
/// Ingestion-time validation errors are surfaced synchronously to callers;
/// delivery-time failures are recorded on the delivery row instead and never
/// appear here.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An event or subscription referenced an unregistered event type name.
    #[error("Unknown event type: '{0}'")]
    UnknownEventType(String),

    /// Scope attributes are inconsistent with the event type's declared shape.
    #[error("Scope mismatch: {0}")]
    ScopeMismatch(String),

    /// An event type name is already registered with a different scope shape.
    #[error("Event type '{0}' is already registered with a different scope shape")]
    DuplicateType(String),

    /// The (subscriber, event type, scope) tuple already exists.
    #[error("Subscriber {subscriber_id} already has an identical subscription to '{event_type}'")]
    DuplicateSubscription {
        subscriber_id: DbId,
        event_type: String,
    },

    /// Lookup miss for an entity that must exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A request failed structural validation.
    #[error("Validation error: {0}")]
    Validation(String),
}
