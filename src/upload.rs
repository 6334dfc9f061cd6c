//! Upload coordination.
//!
//! An upload has two external effects: the payload lands in the content
//! store, then the catalog entry lands on the ledger. The coordinator runs
//! that pipeline for one upload at a time and keeps the failure modes
//! separable:
//!
//! - validation failures are rejected before any I/O;
//! - a store failure leaves the ledger untouched;
//! - a ledger failure after a successful store add leaves an orphaned
//!   blob — accepted, not retried, and surfaced with the stored content id
//!   so an operator can reconcile.
//!
//! Concurrent uploads are rejected rather than queued: the ledger already
//! serializes id assignment, and interleaving two uploads only muddies
//! which caller a failure belongs to.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::ledger::{LedgerError, VideoLedger, VideoRecord};
use crate::store::{ContentStore, StoreError};

/// Errors from an upload attempt.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Rejected before any side effect.
    #[error("invalid upload: {0} must not be empty")]
    Validation(&'static str),

    /// Another upload is still in flight. Retry once it completes.
    #[error("an upload is already in flight")]
    Busy,

    /// The store write failed; no catalog entry was attempted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The payload was stored but the catalog write failed. The blob at
    /// `content_id` is unreferenced until reconciled manually.
    #[error("payload stored as {content_id} but ledger write failed: {source}")]
    Ledger {
        content_id: String,
        #[source]
        source: LedgerError,
    },
}

pub type Result<T> = std::result::Result<T, UploadError>;

/// Orchestrates store-then-record for a single upload at a time.
pub struct UploadCoordinator {
    store: Arc<dyn ContentStore>,
    ledger: Arc<VideoLedger>,
    inflight: Semaphore,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn ContentStore>, ledger: Arc<VideoLedger>) -> Self {
        Self {
            store,
            ledger,
            inflight: Semaphore::new(1),
        }
    }

    /// Whether an upload is currently in flight.
    pub fn busy(&self) -> bool {
        self.inflight.available_permits() == 0
    }

    /// Run one upload end-to-end and return the new catalog record.
    pub async fn upload(&self, bytes: Vec<u8>, title: &str, author: &str) -> Result<VideoRecord> {
        if title.is_empty() {
            return Err(UploadError::Validation("title"));
        }
        if bytes.is_empty() {
            return Err(UploadError::Validation("payload"));
        }

        // Held for the rest of the upload; a second caller is turned away
        // rather than parked behind this one.
        let _permit = self
            .inflight
            .try_acquire()
            .map_err(|_| UploadError::Busy)?;

        let size = bytes.len();
        let content_id = self.store.add(bytes).await?;

        let record = match self.ledger.record(&content_id, title, author).await {
            Ok(record) => record,
            Err(source) => {
                warn!(
                    content_id = %content_id,
                    error = %source,
                    "payload stored but catalog write failed; blob is unreferenced"
                );
                return Err(UploadError::Ledger { content_id, source });
            }
        };

        info!(
            id = record.id,
            content_id = %record.content_id,
            title = %record.title,
            size,
            "upload complete"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;

    /// Store that always fails as unreachable.
    struct OfflineStore;

    #[async_trait]
    impl ContentStore for OfflineStore {
        async fn add(&self, _bytes: Vec<u8>) -> crate::store::Result<String> {
            Err(StoreError::Unavailable("store offline".to_string()))
        }
    }

    /// Store that blocks each add until the test hands it a permit.
    struct GatedStore {
        gate: Semaphore,
    }

    #[async_trait]
    impl ContentStore for GatedStore {
        async fn add(&self, bytes: Vec<u8>) -> crate::store::Result<String> {
            let permit = self.gate.acquire().await.expect("gate closed");
            permit.forget();
            Ok(format!("cid-{}", bytes.len()))
        }
    }

    fn coordinator_with(store: Arc<dyn ContentStore>) -> (Arc<UploadCoordinator>, Arc<VideoLedger>) {
        let ledger = Arc::new(VideoLedger::new());
        let coordinator = Arc::new(UploadCoordinator::new(store, Arc::clone(&ledger)));
        (coordinator, ledger)
    }

    #[tokio::test]
    async fn test_upload_records_catalog_entry() {
        let (coordinator, ledger) = coordinator_with(Arc::new(MemoryStore::new()));

        let record = coordinator
            .upload(b"video bytes".to_vec(), "My Video", "alice")
            .await
            .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(ledger.count().await, 1);

        let stored = ledger.get(1).await.unwrap();
        assert_eq!(stored.title, "My Video");
        assert_eq!(stored.author, "alice");
        assert_eq!(stored.content_id, record.content_id);
    }

    #[tokio::test]
    async fn test_empty_title_rejected_before_store() {
        let (coordinator, ledger) = coordinator_with(Arc::new(MemoryStore::new()));

        coordinator
            .upload(b"video bytes".to_vec(), "First", "alice")
            .await
            .unwrap();

        let err = coordinator
            .upload(b"more bytes".to_vec(), "", "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Validation("title")));
        assert_eq!(ledger.count().await, 1);
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let (coordinator, ledger) = coordinator_with(Arc::new(MemoryStore::new()));

        let err = coordinator
            .upload(Vec::new(), "Titled", "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Validation("payload")));
        assert_eq!(ledger.count().await, 0);
    }

    #[tokio::test]
    async fn test_sequential_uploads_order_catalog() {
        let (coordinator, ledger) = coordinator_with(Arc::new(MemoryStore::new()));

        let first = coordinator
            .upload(b"one".to_vec(), "First", "alice")
            .await
            .unwrap();
        let second = coordinator
            .upload(b"two".to_vec(), "Second", "alice")
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(ledger.count().await, 2);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_ledger_untouched() {
        let (coordinator, ledger) = coordinator_with(Arc::new(OfflineStore));
        let mut events = ledger.subscribe();

        let err = coordinator
            .upload(b"video bytes".to_vec(), "My Video", "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Store(StoreError::Unavailable(_))));
        assert_eq!(ledger.count().await, 0);
        // No creation event either.
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        // The in-flight slot is released on failure.
        assert!(!coordinator.busy());
    }

    #[tokio::test]
    async fn test_second_upload_while_pending_is_busy() {
        let gate = Arc::new(GatedStore {
            gate: Semaphore::new(0),
        });
        let (coordinator, ledger) = coordinator_with(Arc::clone(&gate) as Arc<dyn ContentStore>);

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.upload(b"one".to_vec(), "First", "alice").await }
        });

        // Wait for the first upload to take the in-flight slot.
        while !coordinator.busy() {
            tokio::task::yield_now().await;
        }

        let err = coordinator
            .upload(b"two".to_vec(), "Second", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Busy));

        // Let the first upload finish.
        gate.gate.add_permits(1);
        let record = first.await.unwrap().unwrap();
        assert_eq!(record.id, 1);

        // A subsequent upload goes through normally.
        gate.gate.add_permits(1);
        let second = coordinator
            .upload(b"three".to_vec(), "Third", "alice")
            .await
            .unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(ledger.count().await, 2);
    }
}
