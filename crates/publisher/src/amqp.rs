//! AMQP 0-9-1 implementation of the broker abstraction, backed by `lapin`.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::protocol::{AMQPErrorKind, AMQPSoftError};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};

use push_common::error::BrokerError;

use crate::broker::{BrokerChannel, BrokerConnection, BrokerConnector};

/// AMQP delivery mode 2: the broker writes the message to disk.
const PERSISTENT_DELIVERY_MODE: u8 = 2;

/// Reply code sent with a normal connection close.
const REPLY_SUCCESS: u16 = 200;

/// Connects to a RabbitMQ-compatible broker from an `amqp://` URL.
#[derive(Debug, Clone)]
pub struct AmqpConnector {
    url: String,
}

impl AmqpConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl BrokerConnector for AmqpConnector {
    type Connection = AmqpConnection;

    async fn connect(&self) -> Result<AmqpConnection, BrokerError> {
        let connection = Connection::connect(&self.url, ConnectionProperties::default())
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        tracing::debug!("Connected to AMQP broker");
        Ok(AmqpConnection(connection))
    }
}

pub struct AmqpConnection(Connection);

#[async_trait]
impl BrokerConnection for AmqpConnection {
    type Channel = AmqpChannel;

    async fn open_channel(&self) -> Result<AmqpChannel, BrokerError> {
        let channel = self.0.create_channel().await.map_err(classify)?;
        Ok(AmqpChannel(channel))
    }

    fn is_open(&self) -> bool {
        self.0.status().connected()
    }

    async fn close(&self) -> Result<(), BrokerError> {
        self.0.close(REPLY_SUCCESS, "OK").await.map_err(classify)
    }
}

pub struct AmqpChannel(Channel);

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn probe_queue(&self, queue: &str) -> Result<(), BrokerError> {
        let options = QueueDeclareOptions {
            passive: true,
            ..QueueDeclareOptions::default()
        };
        self.0
            .queue_declare(queue, options, FieldTable::default())
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn publish_persistent(&self, queue: &str, body: &[u8]) -> Result<(), BrokerError> {
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT_DELIVERY_MODE);
        self.0
            .basic_publish("", queue, BasicPublishOptions::default(), body, properties)
            .await
            .map_err(classify)?
            .await
            .map_err(classify)?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.0.status().connected()
    }
}

/// Map a `lapin` error onto the broker error taxonomy.
fn classify(err: lapin::Error) -> BrokerError {
    match &err {
        lapin::Error::ProtocolError(amqp) => match amqp.kind() {
            AMQPErrorKind::Soft(AMQPSoftError::PRECONDITIONFAILED) => {
                BrokerError::PreconditionFailed(amqp.to_string())
            }
            AMQPErrorKind::Soft(AMQPSoftError::NOTFOUND) => {
                BrokerError::NotFound(amqp.to_string())
            }
            AMQPErrorKind::Soft(_) => BrokerError::Channel(amqp.to_string()),
            _ => BrokerError::Connection(amqp.to_string()),
        },
        lapin::Error::IOError(_) | lapin::Error::InvalidConnectionState(_) => {
            BrokerError::Connection(err.to_string())
        }
        _ => BrokerError::Channel(err.to_string()),
    }
}
