//! imgd status collector library
//!
//! This library aggregates operational counters and periodically sampled
//! gauges for the imgd image cache and serves them as a consistent JSON
//! snapshot. Every increment is also forwarded to a metrics sink, typically a
//! Prometheus registry.
//!
//! # Features
//!
//! - **Single Writer**: One task owns all counters and gauges; no locks guard the state
//! - **Back-Pressure**: A bounded ingestion queue makes producers wait instead of dropping events
//! - **Periodic Gauges**: Memory, uptime and cache figures are resampled on a fixed tick
//! - **Consistent Snapshots**: Snapshots are answered by the owning task, never read concurrently
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use imgd_status::{Collaborators, CollectorConfig, EmptyCache, NoopSink, StatusCollector};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), imgd_status::StatusError> {
//! let deps = Collaborators::new(Arc::new(NoopSink), Arc::new(EmptyCache));
//! let (collector, task) = StatusCollector::spawn(&CollectorConfig::default(), deps)?;
//!
//! collector.record_cache_hit().await?;
//! collector.record_requested("skin").await?;
//!
//! let snapshot = collector.snapshot().await?;
//! assert_eq!(snapshot.cache_hits, 1);
//! assert_eq!(snapshot.requested["skin"], 1);
//!
//! let json = collector.export_snapshot().await?;
//! println!("{}", String::from_utf8_lossy(&json));
//!
//! task.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod scheduler;
pub mod state;
pub mod system;

// Re-export main types for convenience
pub use cache::{CacheInfo, EmptyCache};
pub use clock::{Clock, SystemClock};
pub use collector::{Collaborators, CollectorTask, StatusCollector};
pub use config::{CollectorConfig, Config, ServerConfig};
pub use error::StatusError;
pub use event::{EventFamily, StatusEvent};
pub use metrics::{MetricsSink, NoopSink, PrometheusSink};
pub use state::{Gauges, StatusInfo};
pub use system::{MemoryProbe, ProcSelfMemory};
