//! Status endpoint handler.
//!
//! Returns the collector snapshot as JSON. The field names are consumed by
//! dashboards and are produced by `StatusInfo`'s serialization.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, error, instrument};

use crate::app_state::SharedState;

/// Error type for status endpoint failures.
#[derive(Debug)]
pub struct StatusUnavailable;

impl IntoResponse for StatusUnavailable {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to collect status snapshot",
        )
            .into_response()
    }
}

/// Handler for the /status endpoint.
#[instrument(skip(state))]
pub async fn status_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, StatusUnavailable> {
    debug!("Processing /status request");

    let body = state.collector.export_snapshot().await.map_err(|e| {
        error!("Status snapshot failed: {}", e);
        StatusUnavailable
    })?;

    debug!("Status request completed: {} bytes", body.len());
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
