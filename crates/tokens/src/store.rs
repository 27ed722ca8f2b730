//! Token metadata store — user → device token bindings plus per-token validity.
//!
//! Key scheme, under one fixed prefix `P`:
//! - `P + "user:" + user_id` → hash with field `token`
//! - `P + token` → hash with fields `is_valid`, `last_validated`
//!
//! The two keys are independent: removing a user's binding leaves the token's
//! metadata in place, and rebinding a user leaves the old token's metadata
//! behind.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};

use push_common::config::AppConfig;
use push_common::error::StoreError;
use push_common::types::TokenValidation;

use crate::backend::{RemoveOutcome, TOKEN_FIELD, TokenBackend};
use crate::redis_backend::RedisBackend;

/// Builds keys under the shared token metadata prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn user_key(&self, user_id: i64) -> String {
        format!("{}user:{}", self.prefix, user_id)
    }

    pub fn token_key(&self, token: &str) -> String {
        format!("{}{}", self.prefix, token)
    }
}

/// Reads and writes token bindings through a `TokenBackend`.
pub struct TokenMetadataStore<B: TokenBackend> {
    backend: B,
    keys: KeySpace,
}

impl TokenMetadataStore<RedisBackend> {
    /// Connect to the Redis instance named in `config`.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let backend = RedisBackend::connect(config.require_redis_url()?).await?;
        Ok(Self::new(backend, KeySpace::new(&config.token_metadata_prefix)))
    }
}

impl<B: TokenBackend> TokenMetadataStore<B> {
    pub fn new(backend: B, keys: KeySpace) -> Self {
        Self { backend, keys }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// All fields stored for `user_id`; empty when the user has no binding.
    pub async fn list(&self, user_id: i64) -> Result<BTreeMap<String, String>, StoreError> {
        self.backend.read_hash(&self.keys.user_key(user_id)).await
    }

    /// The device token bound to `user_id`, if any.
    pub async fn lookup(&self, user_id: i64) -> Result<Option<String>, StoreError> {
        self.backend
            .read_field(&self.keys.user_key(user_id), TOKEN_FIELD)
            .await
    }

    /// Validity metadata for `token`, or `None` if nothing was ever recorded.
    pub async fn metadata(&self, token: &str) -> Result<Option<TokenValidation>, StoreError> {
        let fields = self.backend.read_hash(&self.keys.token_key(token)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(TokenValidation::from_fields(token, &fields)))
    }

    /// Bind `token` to `user_id`, replacing any previous binding, and mark
    /// the token valid.
    pub async fn add(&self, user_id: i64, token: &str) -> Result<(), StoreError> {
        let validated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let previous = self
            .backend
            .bind_token(
                &self.keys.user_key(user_id),
                &self.keys.token_key(token),
                token,
                &validated_at,
            )
            .await?;

        match previous {
            Some(old) if old != token => {
                tracing::info!(user_id, "Replaced device token; old token metadata left in place");
            }
            _ => tracing::debug!(user_id, "Bound device token"),
        }
        Ok(())
    }

    /// Remove the binding for `user_id`. With `token`, only a binding to that
    /// exact token is removed.
    pub async fn remove(
        &self,
        user_id: i64,
        token: Option<&str>,
    ) -> Result<RemoveOutcome, StoreError> {
        let outcome = self
            .backend
            .unbind_token(&self.keys.user_key(user_id), token)
            .await?;
        tracing::debug!(user_id, ?outcome, "Token removal");
        Ok(outcome)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.backend.ping().await
    }
}
