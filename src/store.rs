//! Content-addressed payload store adapters.
//!
//! The store is an external collaborator: it accepts raw payload bytes and
//! answers with an opaque content identifier derived from the content. The
//! catalog never inspects payloads or compares identifiers. Retrieval
//! stays on the store's side; the only read path the node constructs is
//! the gateway playback address, a pure string operation.

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::identity::Identity;

/// Errors from store operations.
///
/// The store either stored the payload and returned an identifier, or it
/// failed with one of these; there is no partial success to recover.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store unreachable.
    #[error("content store unreachable: {0}")]
    Unavailable(String),

    /// Request did not complete in time. Whether the store kept the
    /// payload is unknown; the caller may retry the whole upload.
    #[error("content store request timed out: {0}")]
    Timeout(String),

    /// Request failed mid-flight.
    #[error("content store request failed: {0}")]
    Transport(String),

    /// Store answered with a non-success status.
    #[error("content store rejected upload: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Write surface of the content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a payload, returning its content identifier.
    ///
    /// Identical bytes should yield the same identifier, but callers must
    /// treat the result as opaque either way.
    async fn add(&self, bytes: Vec<u8>) -> Result<String>;
}

/// Derive the externally visible playback address for a stored payload.
pub fn playback_url(gateway_base: &str, content_id: &str) -> String {
    format!("{}/{}", gateway_base.trim_end_matches('/'), content_id)
}

/// HTTP adapter for a remote content store.
///
/// POSTs the raw payload to the store's write endpoint; the response body
/// is the content identifier. When an identity is configured, each request
/// carries signed upload credentials.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    identity: Option<Identity>,
}

impl HttpStore {
    pub fn new(client: reqwest::Client, base_url: String, identity: Option<Identity>) -> Self {
        Self {
            client,
            base_url,
            identity,
        }
    }

    fn write_url(&self) -> String {
        format!("{}/api/v1/blobs", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<String> {
        let size = bytes.len();
        let mut request = self.client.post(self.write_url()).body(bytes);

        if let Some(identity) = &self.identity {
            let creds = identity.credentials();
            request = request
                .header("X-Pubkey", &creds.pubkey)
                .header("X-Timestamp", creds.timestamp.to_string())
                .header("X-Signature", &creds.signature);
        }

        let response = request.send().await.map_err(classify)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = if body.is_empty() {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown error")
                )
            } else {
                format!("HTTP {}: {}", status.as_u16(), body)
            };
            return Err(StoreError::Rejected(reason));
        }

        let content_id = response.text().await.map_err(classify)?.trim().to_string();
        if content_id.is_empty() {
            return Err(StoreError::Rejected(
                "store returned no content identifier".to_string(),
            ));
        }

        debug!(content_id = %content_id, size, "payload stored");
        Ok(content_id)
    }
}

fn classify(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(e.to_string())
    } else if e.is_connect() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Transport(e.to_string())
    }
}

/// In-process store for local development and tests.
///
/// Payloads are addressed by their SHA-256 digest, so identical bytes land
/// on the same identifier and re-uploads are free.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a payload is held under this identifier.
    pub async fn contains(&self, content_id: &str) -> bool {
        self.blobs.read().await.contains_key(content_id)
    }

    /// Number of distinct payloads held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<String> {
        let content_id = format!("b{}", hex::encode(Sha256::digest(&bytes)));
        self.blobs.write().await.insert(content_id.clone(), bytes);
        Ok(content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_url() {
        assert_eq!(
            playback_url("https://gateway.example/ipfs", "bafyxyz"),
            "https://gateway.example/ipfs/bafyxyz"
        );
        // Trailing slash on the base does not double up.
        assert_eq!(
            playback_url("https://gateway.example/ipfs/", "bafyxyz"),
            "https://gateway.example/ipfs/bafyxyz"
        );
    }

    #[tokio::test]
    async fn test_memory_store_is_content_addressed() {
        let store = MemoryStore::new();

        let a = store.add(b"same bytes".to_vec()).await.unwrap();
        let b = store.add(b"same bytes".to_vec()).await.unwrap();
        let c = store.add(b"other bytes".to_vec()).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        // Deduplicated: two distinct payloads, three adds.
        assert_eq!(store.len().await, 2);
        assert!(store.contains(&a).await);
    }

    #[test]
    fn test_http_store_write_url() {
        let store = HttpStore::new(
            reqwest::Client::new(),
            "http://localhost:8080/".to_string(),
            None,
        );
        assert_eq!(store.write_url(), "http://localhost:8080/api/v1/blobs");
    }
}
