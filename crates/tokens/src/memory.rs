//! In-process `TokenBackend`, for tests and local tooling without Redis.
//!
//! A single lock guards every hash, so each operation is atomic in the same
//! sense as the Redis scripts. Emptied hashes are dropped, matching Redis.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use push_common::error::StoreError;

use crate::backend::{RemoveOutcome, TOKEN_FIELD, TokenBackend, VALID_FLAG};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    hashes: Mutex<HashMap<String, BTreeMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn key_count(&self) -> usize {
        self.hashes.lock().await.len()
    }
}

#[async_trait]
impl TokenBackend for MemoryBackend {
    async fn read_hash(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.hashes.lock().await.get(key).cloned().unwrap_or_default())
    }

    async fn read_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .hashes
            .lock()
            .await
            .get(key)
            .and_then(|hash| hash.get(field).cloned()))
    }

    async fn bind_token(
        &self,
        user_key: &str,
        token_key: &str,
        token: &str,
        validated_at: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut hashes = self.hashes.lock().await;
        let previous = hashes
            .entry(user_key.to_string())
            .or_default()
            .insert(TOKEN_FIELD.to_string(), token.to_string());

        let meta = hashes.entry(token_key.to_string()).or_default();
        meta.insert("is_valid".to_string(), VALID_FLAG.to_string());
        meta.insert("last_validated".to_string(), validated_at.to_string());
        Ok(previous)
    }

    async fn unbind_token(
        &self,
        user_key: &str,
        expected: Option<&str>,
    ) -> Result<RemoveOutcome, StoreError> {
        let mut hashes = self.hashes.lock().await;
        let Some(hash) = hashes.get_mut(user_key) else {
            return Ok(RemoveOutcome::Absent);
        };
        let outcome = match (hash.get(TOKEN_FIELD), expected) {
            (None, _) => RemoveOutcome::Absent,
            (Some(current), Some(expected)) if current != expected => RemoveOutcome::Mismatch,
            (Some(_), _) => {
                hash.remove(TOKEN_FIELD);
                RemoveOutcome::Removed
            }
        };
        if hash.is_empty() {
            hashes.remove(user_key);
        }
        Ok(outcome)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emptied_user_hash_is_dropped() {
        let backend = MemoryBackend::new();
        backend
            .bind_token("p:user:1", "p:T1", "T1", "2025-01-01T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(backend.key_count().await, 2);

        let outcome = backend.unbind_token("p:user:1", None).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed);
        // Only the token metadata hash is left.
        assert_eq!(backend.key_count().await, 1);
        assert!(backend.read_hash("p:user:1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_unbind_keeps_user_hash() {
        let backend = MemoryBackend::new();
        backend
            .bind_token("p:user:1", "p:T1", "T1", "2025-01-01T00:00:00Z")
            .await
            .unwrap();

        let outcome = backend.unbind_token("p:user:1", Some("T2")).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::Mismatch);
        assert_eq!(backend.key_count().await, 2);
        assert_eq!(
            backend.read_field("p:user:1", TOKEN_FIELD).await.unwrap().as_deref(),
            Some("T1")
        );
    }
}
