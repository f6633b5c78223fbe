//! Local snapshot storage.

mod memory;
mod traits;

pub use memory::MemoryCache;
pub use traits::{root_snapshot_key, CacheStorage, CacheStorageExt};
