//! Error type shared by the collector, its collaborators and configuration.

/// Errors surfaced by the status collector.
///
/// Ingestion never fails for the content of an event; the only ingestion
/// failure is a collector that has already stopped.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("status collector has stopped")]
    CollectorStopped,

    #[error("failed to serialize status snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("collector task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
