pub mod notifier;
pub mod redpanda;

pub use notifier::{LogPublisher, NotificationPublisher, PublishError};
pub use redpanda::RedpandaPublisher;
