pub mod delivery;
pub mod event;
pub mod subscriber;
pub mod subscription;

pub use delivery::{Delivery, DeliveryStatus};
pub use event::{Event, EventType};
pub use subscriber::{Subscriber, SubscriberKind};
pub use subscription::Subscription;
