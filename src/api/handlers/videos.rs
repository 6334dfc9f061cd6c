//! Catalog and upload handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::ApiState;
use crate::ledger::{LedgerError, VideoRecord};
use crate::store::playback_url;
use crate::upload::UploadError;

/// Video record response.
#[derive(Serialize)]
pub struct VideoResponse {
    /// Catalog id.
    pub id: u64,

    /// Content identifier of the stored payload.
    pub content_id: String,

    /// Uploader-supplied title.
    pub title: String,

    /// Identity that performed the write.
    pub author: String,

    /// Derived playback address.
    pub playback_url: String,
}

impl VideoResponse {
    fn from_record(record: &VideoRecord, gateway_url: &str) -> Self {
        VideoResponse {
            id: record.id,
            content_id: record.content_id.clone(),
            title: record.title.clone(),
            author: record.author.clone(),
            playback_url: playback_url(gateway_url, &record.content_id),
        }
    }
}

/// Full catalog response: newest first, with the default selection.
#[derive(Serialize)]
pub struct CatalogResponse {
    pub videos: Vec<VideoResponse>,
    pub selected: Option<VideoResponse>,
}

/// List the full catalog, newest first.
pub async fn list_videos(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<CatalogResponse>, (StatusCode, String)> {
    let view = state.reader.load().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load catalog");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let videos = view
        .videos
        .iter()
        .map(|v| VideoResponse::from_record(v, &state.gateway_url))
        .collect();
    let selected = view
        .selected
        .as_ref()
        .map(|v| VideoResponse::from_record(v, &state.gateway_url));

    Ok(Json(CatalogResponse { videos, selected }))
}

/// Get a specific record.
pub async fn get_video(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
) -> Result<Json<VideoResponse>, (StatusCode, String)> {
    match state.ledger.get(id).await {
        Ok(record) => Ok(Json(VideoResponse::from_record(&record, &state.gateway_url))),
        Err(e @ LedgerError::NotFound { .. }) => Err((StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Upload query parameters.
#[derive(Deserialize)]
pub struct UploadParams {
    /// Title for the new catalog entry.
    pub title: String,
}

/// Upload a video.
///
/// The raw request body is the payload; the title comes from the query
/// string. Drives the full store-then-record pipeline and answers with the
/// new catalog entry.
pub async fn upload_video(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<VideoResponse>), (StatusCode, String)> {
    let record = state
        .coordinator
        .upload(body.to_vec(), &params.title, &state.author)
        .await
        .map_err(|e| {
            let status = match &e {
                UploadError::Validation(_) => StatusCode::BAD_REQUEST,
                UploadError::Busy => StatusCode::CONFLICT,
                // Store and ledger failures are upstream failures; the
                // ledger variant's message carries the orphaned content id.
                UploadError::Store(_) | UploadError::Ledger { .. } => StatusCode::BAD_GATEWAY,
            };
            (status, e.to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(VideoResponse::from_record(&record, &state.gateway_url)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_response_derives_playback_url() {
        let record = VideoRecord {
            id: 7,
            content_id: "bafyxyz".to_string(),
            title: "My Video".to_string(),
            author: "ed25519p/ab".to_string(),
        };

        let response = VideoResponse::from_record(&record, "https://gateway.example/ipfs/");

        assert_eq!(response.id, 7);
        assert_eq!(response.playback_url, "https://gateway.example/ipfs/bafyxyz");
    }
}
