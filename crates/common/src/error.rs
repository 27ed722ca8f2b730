use thiserror::Error;

/// Rejection of an inbound event that cannot be turned into a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Event must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid created_at timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Malformed message body: {0}")]
    Malformed(String),
}

/// Failures reported by a broker transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// The queue exists with arguments that differ from what was asked for
    /// (AMQP reply code 406). The broker closes the channel.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The queue does not exist (AMQP reply code 404). The broker closes the channel.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Channel error: {0}")]
    Channel(String),
}

impl BrokerError {
    /// Whether this error is the configuration-mismatch class the publisher
    /// recovers from by reopening a channel and skipping declaration.
    pub fn is_config_mismatch(&self) -> bool {
        matches!(self, BrokerError::PreconditionFailed(_))
    }
}

/// Outcome of a failed publish attempt, surfaced to the caller.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to connect to broker: {0}")]
    Connect(#[source] BrokerError),

    #[error("Failed to publish message: {0}")]
    Publish(#[source] BrokerError),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures of the key-value store backing the token metadata.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Key-value store unreachable: {0}")]
    Connectivity(String),

    #[error("Key-value store not configured: {0}")]
    Config(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Connectivity(err.to_string())
    }
}
