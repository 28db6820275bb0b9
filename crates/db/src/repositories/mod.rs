pub mod delivery_repo;
pub mod event_repo;
pub mod event_type_repo;
pub mod subscriber_repo;
pub mod subscription_repo;

pub use delivery_repo::{DeliveryFilter, DeliveryRepo};
pub use event_repo::EventRepo;
pub use event_type_repo::EventTypeRepo;
pub use subscriber_repo::SubscriberRepo;
pub use subscription_repo::SubscriptionRepo;
