//! Status collector: ingestion handle and the single-writer aggregation task.
//!
//! All status state lives inside one spawned task. Producers never touch it;
//! they enqueue commands on a bounded channel, and the task applies them one
//! at a time, interleaved with periodic gauge samples. Snapshots are requests
//! answered by the same task, so a snapshot always reflects a state that
//! existed between two mutations.
//!
//! # Back-pressure
//!
//! The ingestion queue is bounded. When the task falls behind (for example
//! while a slow `MetricsSink` or `CacheInfo` call is in progress) producers
//! wait for queue space instead of losing events.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::cache::CacheInfo;
use crate::clock::{Clock, SystemClock};
use crate::config::CollectorConfig;
use crate::error::StatusError;
use crate::event::StatusEvent;
use crate::metrics::MetricsSink;
use crate::scheduler::Scheduler;
use crate::state::{Gauges, StatusInfo};
use crate::system::{MemoryProbe, ProcSelfMemory};

/// External services the collector task reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub metrics: Arc<dyn MetricsSink>,
    pub cache: Arc<dyn CacheInfo>,
    pub clock: Arc<dyn Clock>,
    pub memory: Arc<dyn MemoryProbe>,
}

impl Collaborators {
    /// Uses the system clock and procfs memory probe.
    pub fn new(metrics: Arc<dyn MetricsSink>, cache: Arc<dyn CacheInfo>) -> Self {
        Self {
            metrics,
            cache,
            clock: Arc::new(SystemClock),
            memory: Arc::new(ProcSelfMemory),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_memory_probe(mut self, memory: Arc<dyn MemoryProbe>) -> Self {
        self.memory = memory;
        self
    }
}

enum Command {
    Event(StatusEvent),
    Snapshot(oneshot::Sender<StatusInfo>),
}

/// Cloneable handle used by producers to report events and read snapshots.
#[derive(Clone)]
pub struct StatusCollector {
    tx: mpsc::Sender<Command>,
}

/// Owner handle for the running collector task.
///
/// Dropping it detaches the task, which then runs until every
/// `StatusCollector` handle is gone.
pub struct CollectorTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl StatusCollector {
    /// Validates `config`, captures the start time and spawns the collector
    /// task on the current tokio runtime.
    pub fn spawn(
        config: &CollectorConfig,
        deps: Collaborators,
    ) -> Result<(Self, CollectorTask), StatusError> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let scheduler = Scheduler::new(config.tick_interval());
        let aggregator = Aggregator::new(deps);

        let handle = tokio::spawn(aggregator.run(rx, scheduler, shutdown_rx));

        Ok((
            Self { tx },
            CollectorTask {
                shutdown: shutdown_tx,
                handle,
            },
        ))
    }

    /// Enqueues an event, waiting for queue space if the collector is behind.
    pub async fn record(&self, event: StatusEvent) -> Result<(), StatusError> {
        self.tx
            .send(Command::Event(event))
            .await
            .map_err(|_| StatusError::CollectorStopped)
    }

    /// Enqueues an event from a thread outside the async runtime, blocking the
    /// thread while the queue is full.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn record_blocking(&self, event: StatusEvent) -> Result<(), StatusError> {
        self.tx
            .blocking_send(Command::Event(event))
            .map_err(|_| StatusError::CollectorStopped)
    }

    /// Should be called every time a skin is served from the cache.
    pub async fn record_cache_hit(&self) -> Result<(), StatusError> {
        self.record(StatusEvent::CacheHit).await
    }

    /// Should be called every time serving a skin from the cache fails.
    pub async fn record_cache_miss(&self) -> Result<(), StatusError> {
        self.record(StatusEvent::CacheMiss).await
    }

    pub async fn record_requested(&self, category: impl Into<String>) -> Result<(), StatusError> {
        self.record(StatusEvent::Requested(category.into())).await
    }

    pub async fn record_api_requested(
        &self,
        category: impl Into<String>,
    ) -> Result<(), StatusError> {
        self.record(StatusEvent::ApiRequested(category.into())).await
    }

    pub async fn record_error(&self, kind: impl Into<String>) -> Result<(), StatusError> {
        self.record(StatusEvent::Errored(kind.into())).await
    }

    /// Returns a copy of the state after every event this handle enqueued
    /// earlier has been applied.
    pub async fn snapshot(&self) -> Result<StatusInfo, StatusError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply_tx))
            .await
            .map_err(|_| StatusError::CollectorStopped)?;
        reply_rx.await.map_err(|_| StatusError::CollectorStopped)
    }

    /// Returns the snapshot encoded as JSON.
    pub async fn export_snapshot(&self) -> Result<Vec<u8>, StatusError> {
        let info = self.snapshot().await?;
        Ok(serde_json::to_vec(&info)?)
    }
}

impl CollectorTask {
    /// Stops the collector after applying every command already queued, then
    /// waits for the task to finish.
    pub async fn shutdown(self) -> Result<(), StatusError> {
        // The task may already have exited on its own
        let _ = self.shutdown.send(());
        self.handle.await?;
        Ok(())
    }

    /// Waits for the task to exit without requesting a shutdown.
    pub async fn join(self) -> Result<(), StatusError> {
        self.handle.await?;
        Ok(())
    }
}

/// Single owner of the status state.
struct Aggregator {
    info: StatusInfo,
    started_at: DateTime<Utc>,
    deps: Collaborators,
}

impl Aggregator {
    fn new(deps: Collaborators) -> Self {
        Self {
            info: StatusInfo::default(),
            started_at: deps.clock.now(),
            deps,
        }
    }

    #[instrument(skip_all, fields(period = ?scheduler.period()))]
    async fn run(
        mut self,
        mut rx: mpsc::Receiver<Command>,
        scheduler: Scheduler,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        info!("Status collector started");

        self.sample_gauges(scheduler.period());
        let mut ticks = scheduler.start();
        let mut detached = false;

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        debug!("All collector handles dropped");
                        break;
                    }
                },
                _ = ticks.tick() => self.sample_gauges(scheduler.period()),
                signal = &mut shutdown, if !detached => match signal {
                    Ok(()) => {
                        debug!("Shutdown requested, draining queued commands");
                        rx.close();
                        while let Some(command) = rx.recv().await {
                            self.handle(command);
                        }
                        break;
                    }
                    Err(_) => {
                        debug!("Collector task detached");
                        detached = true;
                    }
                },
            }
        }

        info!(
            "Status collector stopped: {} hits, {} misses, {} requests",
            self.info.cache_hits,
            self.info.cache_misses,
            self.info.total_requested()
        );
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Event(event) => {
                let (family, label) = event.family_and_label();
                self.deps.metrics.increment(family, label);
                self.info.apply(&event);
                trace!(family = family.as_str(), label, "Applied status event");
            }
            Command::Snapshot(reply) => {
                if reply.send(self.info.clone()).is_err() {
                    debug!("Snapshot requester went away before reply");
                }
            }
        }
    }

    fn sample_gauges(&mut self, period: Duration) {
        let start = Instant::now();

        let gauges = Gauges {
            memory_bytes: self.deps.memory.resident_bytes(),
            uptime_seconds: (self.deps.clock.now() - self.started_at).num_seconds(),
            cache_size: self.deps.cache.size(),
            cache_memory_bytes: self.deps.cache.memory_bytes(),
        };
        self.info.set_gauges(gauges);

        let elapsed = start.elapsed();
        if elapsed > period {
            warn!(
                "Gauge sampling took {:.2}s, longer than the {:.2}s tick period; producers are being held back",
                elapsed.as_secs_f64(),
                period.as_secs_f64()
            );
        }

        debug!(
            "Sampled gauges: mem={} bytes, uptime={}s, cache_size={}, cache_mem={} bytes",
            gauges.memory_bytes, gauges.uptime_seconds, gauges.cache_size, gauges.cache_memory_bytes
        );
    }
}
