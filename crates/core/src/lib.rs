//! Domain logic for the relay event bus.
//!
//! Pure types and functions shared by the persistence layer, the delivery
//! engine, and the API. No I/O lives here:
//!
//! - [`error::CoreError`] — the domain error taxonomy.
//! - [`event_type`] — event type name grammar and declared scope shapes.
//! - [`scope`] — event/subscription scoping and shape validation.
//! - [`matcher`] — pure subscription matching for a stored event.
//! - [`backoff`] — exponential retry backoff with jitter.
//! - [`signing`] — HMAC-SHA256 webhook request signatures.

pub mod backoff;
pub mod error;
pub mod event_type;
pub mod matcher;
pub mod scope;
pub mod signing;
pub mod types;

pub use error::CoreError;
pub use event_type::ScopeShape;
pub use scope::{EventScope, SubscriptionScope};
