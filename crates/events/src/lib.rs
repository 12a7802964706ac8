//! Story-bible change events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope, tagged with an [`EventType`].
//! - [`EventLogger`]: background subscriber that traces every event.

pub mod bus;
pub mod logger;

pub use bus::{DomainEvent, EventBus, EventType};
pub use logger::EventLogger;
