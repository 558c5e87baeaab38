//! Cache figures sampled on every tick.

/// Source of the image cache's size and memory footprint.
///
/// Queried synchronously from the collector task.
pub trait CacheInfo: Send + Sync {
    /// Number of entries currently cached.
    fn size(&self) -> u64;
    /// Memory held by the cache in bytes.
    fn memory_bytes(&self) -> u64;
}

/// Cache provider for hosts without a cache attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCache;

impl CacheInfo for EmptyCache {
    fn size(&self) -> u64 {
        0
    }

    fn memory_bytes(&self) -> u64 {
        0
    }
}
