//! Relay event bus services.
//!
//! This crate provides the service layer between the HTTP surface and the
//! persistence layer:
//!
//! - [`EventTypeCatalog`] — registration and lookup of event type names and
//!   their declared scope shapes.
//! - [`EventIngest`] — validated event recording with synchronous delivery
//!   fan-out.
//! - [`SubscriptionRegistry`] — subscriber and subscription management.
//! - [`DeliveryEngine`] — background workers that claim due deliveries and
//!   push them through a [`transport::Dispatcher`].
//! - [`transport`] — outbound channels (signed webhooks, analytics sink).

pub mod catalog;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod registry;
pub mod transport;

pub use catalog::EventTypeCatalog;
pub use engine::{DeliveryEngine, EngineConfig};
pub use error::EngineError;
pub use ingest::EventIngest;
pub use registry::SubscriptionRegistry;
