use redis::Client;
use redis::aio::ConnectionManager;

use crate::error::StoreError;

/// Create a Redis connection manager for async operations.
///
/// Issues a `PING` before returning so an unreachable server is reported
/// here rather than on the first real command.
pub async fn create_redis_pool(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let client = Client::open(redis_url)?;
    let mut manager = ConnectionManager::new(client).await?;
    let _: String = redis::cmd("PING").query_async(&mut manager).await?;

    tracing::info!("Connected to Redis");
    Ok(manager)
}
