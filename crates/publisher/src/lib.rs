//! Publishing notification events onto a shared broker queue.

pub mod amqp;
pub mod broker;
pub mod publisher;

pub use amqp::AmqpConnector;
pub use publisher::{ProbeOutcome, SafeQueuePublisher};

/// Publisher wired to a real AMQP broker.
pub type AmqpPublisher = SafeQueuePublisher<AmqpConnector>;

/// Build a publisher for the broker at `url`.
pub fn amqp_publisher(url: &str) -> AmqpPublisher {
    SafeQueuePublisher::new(AmqpConnector::new(url))
}
