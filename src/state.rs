//! Aggregate status state owned by the collector task.
//!
//! `StatusInfo` is both the live state mutated by the collector and the
//! snapshot handed out to callers. The serialized field names are consumed by
//! dashboards and must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::event::StatusEvent;

/// Gauge values sampled together on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gauges {
    /// Resident memory of the process in bytes.
    pub memory_bytes: u64,
    /// Seconds since the collector was started.
    pub uptime_seconds: i64,
    /// Number of entries in the image cache.
    pub cache_size: u64,
    /// Memory held by the image cache in bytes.
    pub cache_memory_bytes: u64,
}

/// Counters and gauges reported by the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Number of bytes allocated to the process.
    #[serde(rename = "ImgdMem")]
    pub imgd_mem: u64,
    /// Time in seconds the process has been running for.
    #[serde(rename = "Uptime")]
    pub uptime: i64,
    /// Number of times each error kind has been recorded.
    #[serde(rename = "Errored")]
    pub errored: BTreeMap<String, u64>,
    /// Number of times each request category has been served.
    #[serde(rename = "Requested")]
    pub requested: BTreeMap<String, u64>,
    /// Number of times each API request category has been made.
    #[serde(rename = "APIRequested")]
    pub api_requested: BTreeMap<String, u64>,
    /// Number of skins served from the cache.
    #[serde(rename = "CacheHits")]
    pub cache_hits: u64,
    /// Number of skins that could not be served from the cache.
    #[serde(rename = "CacheMisses")]
    pub cache_misses: u64,
    /// Number of skins in the cache.
    #[serde(rename = "CacheSize")]
    pub cache_size: u64,
    /// Size of the cache memory in bytes.
    #[serde(rename = "CacheMem")]
    pub cache_mem: u64,
}

impl StatusInfo {
    /// Applies one event to the counters.
    pub fn apply(&mut self, event: &StatusEvent) {
        match event {
            StatusEvent::CacheHit => self.cache_hits = self.cache_hits.saturating_add(1),
            StatusEvent::CacheMiss => self.cache_misses = self.cache_misses.saturating_add(1),
            StatusEvent::Requested(category) => bump(&mut self.requested, category),
            StatusEvent::ApiRequested(category) => bump(&mut self.api_requested, category),
            StatusEvent::Errored(kind) => bump(&mut self.errored, kind),
        }
    }

    /// Replaces every gauge at once.
    pub fn set_gauges(&mut self, gauges: Gauges) {
        self.imgd_mem = gauges.memory_bytes;
        self.uptime = gauges.uptime_seconds;
        self.cache_size = gauges.cache_size;
        self.cache_mem = gauges.cache_memory_bytes;
    }

    /// Sum of all request category counters.
    pub fn total_requested(&self) -> u64 {
        self.requested.values().sum()
    }
}

/// Get-or-default-then-increment for a labelled counter.
fn bump(counters: &mut BTreeMap<String, u64>, key: &str) {
    // Lookup first so existing buckets don't allocate a new key
    if let Some(count) = counters.get_mut(key) {
        *count = count.saturating_add(1);
    } else {
        counters.insert(key.to_string(), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_creates_bucket_with_one() {
        let mut info = StatusInfo::default();
        info.apply(&StatusEvent::Errored("timeout".into()));
        assert_eq!(info.errored.get("timeout"), Some(&1));

        info.apply(&StatusEvent::Errored("timeout".into()));
        info.apply(&StatusEvent::Errored("".into()));
        assert_eq!(info.errored.get("timeout"), Some(&2));
        assert_eq!(info.errored.get(""), Some(&1));
    }

    #[test]
    fn test_cache_counters_are_independent() {
        let mut info = StatusInfo::default();
        info.apply(&StatusEvent::CacheHit);
        info.apply(&StatusEvent::Requested("skin".into()));
        info.apply(&StatusEvent::CacheMiss);
        info.apply(&StatusEvent::CacheHit);

        assert_eq!(info.cache_hits, 2);
        assert_eq!(info.cache_misses, 1);
        assert_eq!(info.total_requested(), 1);
    }

    #[test]
    fn test_set_gauges_replaces_all_fields() {
        let mut info = StatusInfo::default();
        info.apply(&StatusEvent::CacheHit);
        let gauges = Gauges {
            memory_bytes: 4096,
            uptime_seconds: 12,
            cache_size: 3,
            cache_memory_bytes: 1024,
        };
        info.set_gauges(gauges);

        assert_eq!(info.imgd_mem, 4096);
        assert_eq!(info.uptime, 12);
        assert_eq!(info.cache_size, 3);
        assert_eq!(info.cache_mem, 1024);
        // Counters are untouched by gauge updates
        assert_eq!(info.cache_hits, 1);
    }

    #[test]
    fn test_json_field_names() {
        let mut info = StatusInfo::default();
        info.apply(&StatusEvent::ApiRequested("uuid".into()));
        let json = serde_json::to_value(&info).unwrap();

        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "APIRequested",
                "CacheHits",
                "CacheMem",
                "CacheMisses",
                "CacheSize",
                "Errored",
                "ImgdMem",
                "Requested",
                "Uptime",
            ]
        );
        assert_eq!(json["APIRequested"]["uuid"], 1);
        assert!(json["Errored"].as_object().unwrap().is_empty());
    }
}
