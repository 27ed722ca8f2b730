//! Broker client abstraction used by the publisher.
//!
//! Only the primitives the safe-publish handshake needs are exposed: open a
//! connection and a channel, run a passive existence probe, and publish a
//! persistent message through the default exchange.

use async_trait::async_trait;

use push_common::error::BrokerError;

/// Opens connections to a broker.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    type Connection: BrokerConnection;

    async fn connect(&self) -> Result<Self::Connection, BrokerError>;
}

/// A live broker connection.
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    type Channel: BrokerChannel;

    async fn open_channel(&self) -> Result<Self::Channel, BrokerError>;

    /// Whether the broker still considers this connection usable.
    fn is_open(&self) -> bool;

    async fn close(&self) -> Result<(), BrokerError>;
}

/// A channel on a broker connection.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Verify that `queue` exists without creating or altering it.
    async fn probe_queue(&self, queue: &str) -> Result<(), BrokerError>;

    /// Publish `body` to `queue` via the default exchange, marked persistent.
    async fn publish_persistent(&self, queue: &str, body: &[u8]) -> Result<(), BrokerError>;

    fn is_open(&self) -> bool;
}
