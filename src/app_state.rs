//! Application state shared with the HTTP handlers.

use imgd_status::StatusCollector;
use prometheus::Registry;
use std::sync::Arc;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub registry: Registry,
    pub collector: StatusCollector,
}
