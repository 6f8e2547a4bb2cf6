//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Trait for durable string key-value backends
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any previous value at the key
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value by key; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
