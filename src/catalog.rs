//! Read-side catalog reconstruction.
//!
//! The reader rebuilds the full catalog view from the ledger on demand:
//! newest entry first, with the selection defaulting to the newest record.
//! Loads are read-only and may race an in-flight upload; callers treat the
//! view as eventually consistent and reload after a successful upload.

use std::sync::Arc;

use serde::Serialize;

use crate::ledger::{LedgerError, VideoLedger, VideoRecord};

/// Ordered projection of the catalog plus the currently selected record.
///
/// Derived, never persisted; rebuilt by [`CatalogReader::load`]. The
/// selection can be repointed locally without touching the ledger.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogView {
    /// All records, most recent first.
    pub videos: Vec<VideoRecord>,

    /// The record currently selected for playback, if any.
    pub selected: Option<VideoRecord>,
}

impl CatalogView {
    /// Point the selection at an already-loaded record.
    ///
    /// Purely local; never fails and never touches the ledger.
    pub fn select(&mut self, record: &VideoRecord) {
        self.selected = Some(record.clone());
    }
}

/// Rebuilds [`CatalogView`]s from the ledger.
pub struct CatalogReader {
    ledger: Arc<VideoLedger>,
}

impl CatalogReader {
    pub fn new(ledger: Arc<VideoLedger>) -> Self {
        Self { ledger }
    }

    /// Load the full catalog, newest first.
    ///
    /// Scans `get(count) … get(1)` so the view comes back in strictly
    /// decreasing id order. Either the whole load succeeds or the error
    /// propagates; a partially built view is never returned.
    pub async fn load(&self) -> Result<CatalogView, LedgerError> {
        let count = self.ledger.count().await;
        if count == 0 {
            return Ok(CatalogView::default());
        }

        let mut videos = Vec::with_capacity(count as usize);
        for id in (1..=count).rev() {
            videos.push(self.ledger.get(id).await?);
        }

        let selected = videos.first().cloned();
        Ok(CatalogView { videos, selected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_ledger(n: u64) -> Arc<VideoLedger> {
        let ledger = Arc::new(VideoLedger::new());
        for i in 1..=n {
            ledger
                .record(&format!("cid-{i}"), &format!("Video {i}"), "alice")
                .await
                .unwrap();
        }
        ledger
    }

    #[tokio::test]
    async fn test_empty_catalog_has_no_selection() {
        let reader = CatalogReader::new(Arc::new(VideoLedger::new()));

        let view = reader.load().await.unwrap();
        assert!(view.videos.is_empty());
        assert!(view.selected.is_none());
    }

    #[tokio::test]
    async fn test_load_is_newest_first() {
        let ledger = seeded_ledger(3).await;
        let reader = CatalogReader::new(Arc::clone(&ledger));

        let view = reader.load().await.unwrap();

        assert_eq!(view.videos.len(), 3);
        let ids: Vec<u64> = view.videos.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        // The head of the list is the newest ledger entry.
        let newest = ledger.get(3).await.unwrap();
        assert_eq!(view.videos[0], newest);
    }

    #[tokio::test]
    async fn test_selection_defaults_to_newest() {
        let ledger = seeded_ledger(2).await;
        let reader = CatalogReader::new(ledger);

        let view = reader.load().await.unwrap();
        assert_eq!(view.selected.as_ref().map(|v| v.id), Some(2));
    }

    #[tokio::test]
    async fn test_select_repoints_locally() {
        let ledger = seeded_ledger(2).await;
        let reader = CatalogReader::new(ledger);

        let mut view = reader.load().await.unwrap();
        let older = view.videos[1].clone();
        view.select(&older);

        assert_eq!(view.selected.as_ref().map(|v| v.id), Some(1));
        // The catalog itself is untouched.
        assert_eq!(view.videos.len(), 2);
    }
}
