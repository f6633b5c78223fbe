//! In-memory cache implementation.

use async_trait::async_trait;
use std::{collections::HashMap, sync::RwLock};

use super::traits::CacheStorage;

/// In-memory snapshot store.
///
/// Useful for tests and for platforms where the host app supplies no
/// persistent storage; snapshots then live only for the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let data = self.data.read().unwrap();
        data.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &[u8]) {
        let mut data = self.data.write().unwrap();
        data.insert(key.to_owned(), value.to_vec());
    }

    async fn remove(&self, key: &str) {
        let mut data = self.data.write().unwrap();
        data.remove(key);
    }

    async fn clear(&self) {
        let mut data = self.data.write().unwrap();
        data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let cache = MemoryCache::new();

        cache.set("key1", b"value1").await;
        assert_eq!(cache.get("key1").await, Some(b"value1".to_vec()));

        cache.remove("key1").await;
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();

        cache.set("a", b"1").await;
        cache.set("b", b"2").await;

        cache.clear().await;

        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_none());
    }
}
