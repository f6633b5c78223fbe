//! Cache storage trait definitions.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for local snapshot storage backends.
///
/// The library writes one serialized snapshot of the root notification
/// collection after every successful full load and reads it back only when
/// the remote fetch fails. Snapshots carry no freshness guarantee.
#[async_trait]
pub trait CacheStorage: Send + Sync + std::fmt::Debug {
    /// Get a value by key.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Set a value.
    async fn set(&self, key: &str, value: &[u8]);

    /// Remove a value by key.
    async fn remove(&self, key: &str);

    /// Clear all cached values.
    async fn clear(&self);
}

/// Extension trait for cache storage with typed operations.
#[async_trait]
pub trait CacheStorageExt: CacheStorage {
    /// Get a JSON-deserialized value.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let data = self.get(key).await?;
        serde_json::from_slice(&data).ok()
    }

    /// Set a JSON-serialized value.
    async fn set_json<T: serde::Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value).map_err(crate::error::Error::Json)?;
        self.set(key, &data).await;
        Ok(())
    }
}

// Blanket implementation
impl<T: CacheStorage + ?Sized> CacheStorageExt for T {}

/// Snapshot key for the signed-in user's own (root) collection.
pub fn root_snapshot_key(user_id: &str) -> String {
    format!("notifications/root/{}", user_id)
}
