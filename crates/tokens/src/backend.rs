use std::collections::BTreeMap;

use async_trait::async_trait;

use push_common::error::StoreError;

/// Hash field on the per-user key holding the bound device token.
pub const TOKEN_FIELD: &str = "token";

/// Value written to `is_valid` for a freshly bound token.
pub const VALID_FLAG: &str = "True";

/// Result of removing a user's token binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The binding was deleted.
    Removed,
    /// A different token is bound; nothing was deleted.
    Mismatch,
    /// The user has no binding.
    Absent,
}

/// Hash-map primitives the token store needs from a key-value store.
///
/// `bind_token` and `unbind_token` must each be atomic: no other writer may
/// observe or interleave with a half-applied update.
#[async_trait]
pub trait TokenBackend: Send + Sync {
    /// All fields of the hash at `key`; empty when the key does not exist.
    async fn read_hash(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError>;

    async fn read_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    /// Set `token` on the user hash and mark the token hash valid as of
    /// `validated_at`. Returns the token previously bound to the user.
    async fn bind_token(
        &self,
        user_key: &str,
        token_key: &str,
        token: &str,
        validated_at: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Delete the user's `token` field, only if it equals `expected` when given.
    async fn unbind_token(
        &self,
        user_key: &str,
        expected: Option<&str>,
    ) -> Result<RemoveOutcome, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
