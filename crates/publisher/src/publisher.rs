//! Safe queue publisher — publishes to a queue whose arguments may have been
//! set by another producer.
//!
//! Declaring a queue with arguments that differ from the existing ones (e.g.
//! a dead-letter exchange set elsewhere) makes the broker close the channel
//! with `PRECONDITION_FAILED`. The publisher therefore never declares:
//!
//! 1. Connect and open a channel
//! 2. Probe the queue passively
//!    - ok → publish on the same channel (`Verified`)
//!    - precondition failed → open a fresh channel, reconnecting if the broker
//!      dropped the connection too, and publish (`MismatchRecovered`)
//!    - anything else → log and publish anyway (`Degraded`), on a fresh
//!      channel if the probe closed the current one
//! 3. Publish persistently, then close the connection
//!
//! A failed publish is returned to the caller; there is no retry here.

use serde::Serialize;

use push_common::error::PublishError;

use crate::broker::{BrokerChannel, BrokerConnection, BrokerConnector};

/// How the existence probe resolved before the message was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The queue exists and the probe succeeded.
    Verified,
    /// The queue exists with incompatible arguments; published on a fresh channel.
    MismatchRecovered,
    /// The probe failed for another reason; published optimistically.
    Degraded,
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Verified => write!(f, "verified"),
            ProbeOutcome::MismatchRecovered => write!(f, "mismatch_recovered"),
            ProbeOutcome::Degraded => write!(f, "degraded"),
        }
    }
}

/// Publishes messages without ever declaring the target queue.
pub struct SafeQueuePublisher<C: BrokerConnector> {
    connector: C,
}

impl<C: BrokerConnector> SafeQueuePublisher<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Serialize `message` as JSON and publish it to `queue`.
    pub async fn publish<M: Serialize + ?Sized>(
        &self,
        queue: &str,
        message: &M,
    ) -> Result<ProbeOutcome, PublishError> {
        let body = serde_json::to_vec(message)?;
        self.publish_json(queue, &body).await
    }

    /// Publish an already-encoded JSON body to `queue`.
    pub async fn publish_json(&self, queue: &str, body: &[u8]) -> Result<ProbeOutcome, PublishError> {
        let mut connection = self.connector.connect().await.map_err(|e| {
            tracing::error!(queue = %queue, error = %e, "Failed to connect to broker");
            PublishError::Connect(e)
        })?;

        let result = self.probe_and_publish(&mut connection, queue, body).await;
        release(&connection).await;

        match &result {
            Ok(outcome) => {
                tracing::info!(queue = %queue, probe = %outcome, bytes = body.len(), "Message published");
            }
            Err(e) => {
                tracing::error!(queue = %queue, error = %e, "Failed to publish message");
            }
        }
        result
    }

    /// Open and close a connection to check that the broker is reachable.
    pub async fn is_broker_reachable(&self) -> bool {
        match self.connector.connect().await {
            Ok(connection) => {
                release(&connection).await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Broker connectivity check failed");
                false
            }
        }
    }

    async fn probe_and_publish(
        &self,
        connection: &mut C::Connection,
        queue: &str,
        body: &[u8],
    ) -> Result<ProbeOutcome, PublishError> {
        let mut channel = connection
            .open_channel()
            .await
            .map_err(PublishError::Connect)?;

        let outcome = match channel.probe_queue(queue).await {
            Ok(()) => {
                tracing::debug!(queue = %queue, "Passive queue check succeeded");
                ProbeOutcome::Verified
            }
            Err(e) if e.is_config_mismatch() => {
                tracing::warn!(
                    queue = %queue,
                    error = %e,
                    "Queue exists with different arguments; publishing without declaring"
                );
                channel = self.fresh_channel(connection).await?;
                ProbeOutcome::MismatchRecovered
            }
            Err(e) => {
                tracing::warn!(
                    queue = %queue,
                    error = %e,
                    "Passive queue check failed; publishing anyway"
                );
                if !channel.is_open() {
                    channel = self.fresh_channel(connection).await?;
                }
                ProbeOutcome::Degraded
            }
        };

        channel
            .publish_persistent(queue, body)
            .await
            .map_err(PublishError::Publish)?;
        Ok(outcome)
    }

    /// Open a new channel, replacing the connection first if the broker closed it.
    async fn fresh_channel(
        &self,
        connection: &mut C::Connection,
    ) -> Result<<C::Connection as BrokerConnection>::Channel, PublishError> {
        if !connection.is_open() {
            tracing::debug!("Broker closed the connection; reconnecting");
            *connection = self.connector.connect().await.map_err(PublishError::Connect)?;
        }
        connection
            .open_channel()
            .await
            .map_err(PublishError::Connect)
    }
}

async fn release<T: BrokerConnection>(connection: &T) {
    if !connection.is_open() {
        return;
    }
    if let Err(e) = connection.close().await {
        tracing::warn!(error = %e, "Failed to close broker connection");
    }
}
