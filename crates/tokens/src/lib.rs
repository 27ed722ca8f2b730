//! Device token bindings and per-token validity metadata in a shared
//! key-value store.

pub mod backend;
pub mod memory;
pub mod redis_backend;
pub mod store;

pub use backend::{RemoveOutcome, TokenBackend};
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use store::{KeySpace, TokenMetadataStore};
