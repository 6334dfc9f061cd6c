//! Status and health check handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::ApiState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Author identity this node writes records as.
    pub author: String,

    /// Number of catalog records.
    pub videos: u64,

    /// Content store this node uploads to.
    pub store_url: String,

    /// Whether an upload is currently in flight.
    pub upload_in_flight: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        author: state.author.clone(),
        videos: state.ledger.count().await,
        store_url: state.store_url.clone(),
        upload_in_flight: state.coordinator.busy(),
    })
}
