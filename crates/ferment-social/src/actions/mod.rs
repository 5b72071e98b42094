//! User actions: message schema and publisher

pub mod messages;
pub mod publisher;

pub use messages::{ActionMessage, Link, LinkKind};
pub use publisher::{ActionPublisher, PublishCallback};
