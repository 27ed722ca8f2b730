//! Redis implementation of `TokenBackend`.
//!
//! Both multi-step updates run as server-side Lua scripts so Redis executes
//! them as a single command:
//! - bind: set the user's token and the token's validity fields together
//! - unbind: compare the stored token and delete it in one step

use std::collections::BTreeMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use push_common::error::StoreError;
use push_common::redis_pool::create_redis_pool;

use crate::backend::{RemoveOutcome, TOKEN_FIELD, TokenBackend, VALID_FLAG};

/// KEYS[1] = user key, KEYS[2] = token key
/// ARGV[1] = token, ARGV[2] = is_valid flag, ARGV[3] = last_validated
const BIND_SCRIPT: &str = r#"
local previous = redis.call('HGET', KEYS[1], 'token')
redis.call('HSET', KEYS[1], 'token', ARGV[1])
redis.call('HSET', KEYS[2], 'is_valid', ARGV[2], 'last_validated', ARGV[3])
return previous
"#;

/// KEYS[1] = user key, ARGV[1] = expected token
/// Returns 1 when deleted, 0 on mismatch, -1 when no token is bound.
const UNBIND_IF_EQUALS_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], 'token')
if not current then
    return -1
end
if current ~= ARGV[1] then
    return 0
end
redis.call('HDEL', KEYS[1], 'token')
return 1
"#;

/// Token backend over a shared Redis connection manager.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    bind: Script,
    unbind_if_equals: Script,
}

impl RedisBackend {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            bind: Script::new(BIND_SCRIPT),
            unbind_if_equals: Script::new(UNBIND_IF_EQUALS_SCRIPT),
        }
    }

    /// Connect to the Redis server at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(create_redis_pool(redis_url).await?))
    }
}

#[async_trait]
impl TokenBackend for RedisBackend {
    async fn read_hash(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: BTreeMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn read_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn bind_token(
        &self,
        user_key: &str,
        token_key: &str,
        token: &str,
        validated_at: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let previous: Option<String> = self
            .bind
            .key(user_key)
            .key(token_key)
            .arg(token)
            .arg(VALID_FLAG)
            .arg(validated_at)
            .invoke_async(&mut conn)
            .await?;
        Ok(previous)
    }

    async fn unbind_token(
        &self,
        user_key: &str,
        expected: Option<&str>,
    ) -> Result<RemoveOutcome, StoreError> {
        let mut conn = self.conn.clone();
        match expected {
            Some(token) => {
                let result: i64 = self
                    .unbind_if_equals
                    .key(user_key)
                    .arg(token)
                    .invoke_async(&mut conn)
                    .await?;
                Ok(match result {
                    1 => RemoveOutcome::Removed,
                    0 => RemoveOutcome::Mismatch,
                    _ => RemoveOutcome::Absent,
                })
            }
            None => {
                let deleted: i64 = conn.hdel(user_key, TOKEN_FIELD).await?;
                Ok(if deleted > 0 {
                    RemoveOutcome::Removed
                } else {
                    RemoveOutcome::Absent
                })
            }
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
