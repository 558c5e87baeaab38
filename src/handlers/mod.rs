//! HTTP endpoint handlers for the status host.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Plain-text index
//! - `/status`: JSON status snapshot
//! - `/metrics`: Prometheus metrics endpoint

pub mod metrics;
pub mod root;
pub mod status;

// Re-export handlers
pub use metrics::metrics_handler;
pub use root::root_handler;
pub use status::status_handler;
