//! Append-only video catalog ledger.
//!
//! The ledger is the authoritative record of the catalog: every successful
//! upload appends exactly one immutable [`VideoRecord`]. Identifiers are
//! 1-based, unique and gap-free, and the record count always equals the
//! highest assigned id. There is no update, delete or renumbering.
//!
//! Writers are serialized by a single write lock around the
//! validate → assign → append → emit sequence, so id assignment stays
//! linearizable no matter how many tasks call [`VideoLedger::record`]
//! concurrently.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field was empty. Nothing was written.
    #[error("invalid record: {0} must not be empty")]
    Validation(&'static str),

    /// Requested id is outside `[1, count]`.
    #[error("no record with id {id} (catalog holds {count})")]
    NotFound { id: u64, count: u64 },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A single catalog entry.
///
/// Created exactly once by a successful [`VideoLedger::record`] call and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// 1-based, assigned in write order.
    pub id: u64,

    /// Content identifier of the stored payload. Opaque to the ledger.
    pub content_id: String,

    /// Uploader-supplied title.
    pub title: String,

    /// Identity of the signer that performed the write.
    pub author: String,
}

/// Authoritative, append-only catalog of video records.
///
/// Every successful write emits the new record on a broadcast channel, in
/// id order, so listeners (the websocket surface, a CLI watcher) can
/// refresh their view without polling. A subscriber that lags far enough
/// to drop events can always re-read the catalog; the ledger itself is the
/// authority.
pub struct VideoLedger {
    records: RwLock<Vec<VideoRecord>>,
    events: broadcast::Sender<VideoRecord>,
}

impl VideoLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            records: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Subscribe to creation events.
    pub fn subscribe(&self) -> broadcast::Receiver<VideoRecord> {
        self.events.subscribe()
    }

    /// Append a new record and return it.
    ///
    /// The assigned id is `count + 1` at the moment of the write. Both
    /// `content_id` and `title` must be non-empty; a rejected write leaves
    /// the count unchanged and emits nothing.
    pub async fn record(&self, content_id: &str, title: &str, author: &str) -> Result<VideoRecord> {
        if content_id.is_empty() {
            return Err(LedgerError::Validation("content id"));
        }
        if title.is_empty() {
            return Err(LedgerError::Validation("title"));
        }

        let mut records = self.records.write().await;
        let id = records.len() as u64 + 1;
        let record = VideoRecord {
            id,
            content_id: content_id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
        };
        records.push(record.clone());

        debug!(id, content_id = %record.content_id, title = %record.title, "video recorded");

        // Emitted under the write lock so event order matches id order.
        // Send only fails when nobody is subscribed.
        let _ = self.events.send(record.clone());

        Ok(record)
    }

    /// Current highest assigned id; 0 when the catalog is empty.
    pub async fn count(&self) -> u64 {
        self.records.read().await.len() as u64
    }

    /// Fetch a record by id.
    pub async fn get(&self, id: u64) -> Result<VideoRecord> {
        let records = self.records.read().await;
        let count = records.len() as u64;
        if id == 0 || id > count {
            return Err(LedgerError::NotFound { id, count });
        }
        Ok(records[(id - 1) as usize].clone())
    }
}

impl Default for VideoLedger {
    fn default() -> Self {
        Self::new()
    }
}
