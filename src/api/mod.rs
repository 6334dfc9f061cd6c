//! REST API for the curator daemon.
//!
//! Provides HTTP endpoints for:
//! - Catalog browsing (full view and single records, with playback URLs)
//! - Video upload (store payload, record catalog entry)
//! - Health/status
//! - Real-time catalog updates via WebSocket

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogReader;
use crate::ledger::VideoLedger;
use crate::upload::UploadCoordinator;

/// Shared state for API handlers.
pub struct ApiState {
    /// The authoritative catalog ledger.
    pub ledger: Arc<VideoLedger>,

    /// Read-side catalog reconstruction.
    pub reader: CatalogReader,

    /// Upload pipeline, single-flight.
    pub coordinator: UploadCoordinator,

    /// Author identity attributed to records written by this node.
    pub author: String,

    /// Gateway base for playback addresses.
    pub gateway_url: String,

    /// Content store base URL (reported by status).
    pub store_url: String,
}

impl ApiState {
    pub fn new(
        ledger: Arc<VideoLedger>,
        coordinator: UploadCoordinator,
        author: String,
        gateway_url: String,
        store_url: String,
    ) -> Self {
        let reader = CatalogReader::new(Arc::clone(&ledger));
        Self {
            ledger,
            reader,
            coordinator,
            author,
            gateway_url,
            store_url,
        }
    }
}

/// Build the API router with all routes.
pub fn router(state: Arc<ApiState>) -> Router {
    // Allow any origin; the daemon fronts local or trusted clients.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status/health
        .route("/api/v1/status", get(handlers::status::health))
        // Catalog
        .route(
            "/api/v1/videos",
            get(handlers::videos::list_videos).post(handlers::videos::upload_video),
        )
        .route("/api/v1/videos/:id", get(handlers::videos::get_video))
        // WebSocket
        .route("/api/v1/ws", get(handlers::websocket::handler))
        // Middleware
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(())
                .on_response(|response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                    let status = response.status();
                    if !status.is_success() {
                        tracing::warn!(
                            status = %status,
                            latency_ms = latency.as_millis(),
                            "request failed"
                        );
                    }
                })
        )
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: Arc<ApiState>, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!("curator API listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
