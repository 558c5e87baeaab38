//! Root endpoint handler listing the available endpoints.

use axum::response::IntoResponse;
use tracing::{debug, instrument};

/// Handler for the root `/` endpoint.
#[instrument]
pub async fn root_handler() -> impl IntoResponse {
    debug!("Processing / request");

    format!(
        "imgd-status {}\n\nEndpoints:\n  GET /status  - JSON status snapshot\n  GET /metrics - Prometheus metrics\n",
        env!("CARGO_PKG_VERSION")
    )
}
