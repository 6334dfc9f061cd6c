//! Curator - video catalog operations for Riff.
//!
//! Curator coordinates video uploads into a content-addressed store and
//! records each one as an immutable entry on an append-only catalog
//! ledger. The ledger is authoritative; the store holds payload bytes
//! addressed by their content.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CONTENT STORE                              │
//! │  Holds payload bytes, addressed by a content identifier         │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │ add(bytes) → content id
//! ┌───────────────────────────────┴─────────────────────────────────┐
//! │                        CURATOR                                  │
//! │  UploadCoordinator: store payload, then record catalog entry    │
//! │  VideoLedger: append-only catalog, ordered gap-free ids         │
//! │  CatalogReader: newest-first view with a selection pointer      │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │ REST + WebSocket
//! ┌───────────────────────────────┴─────────────────────────────────┐
//! │                        CLIENTS                                  │
//! │  Browse the catalog, upload videos, follow creation events,     │
//! │  play back via <gateway>/<content id>                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Properties
//!
//! - **Ordered catalog**: ids are 1-based, unique and gap-free; the
//!   record count always equals the highest id
//! - **Immutable records**: entries are never updated or deleted
//! - **Separable failures**: a store failure leaves the ledger untouched;
//!   a ledger failure after a store add reports the orphaned content id
//! - **Single-flight uploads**: a second upload attempted while one is
//!   pending is rejected, never silently interleaved

// === Core Modules ===

/// Append-only catalog ledger.
pub mod ledger;

/// Content store adapters.
pub mod store;

/// Upload coordination.
pub mod upload;

/// Read-side catalog reconstruction.
pub mod catalog;

/// Uploader identity.
pub mod identity;

/// Node configuration.
pub mod config;

/// REST API.
pub mod api;

// === Re-exports ===

pub use catalog::{CatalogReader, CatalogView};
pub use config::NodeConfig;
pub use ledger::{LedgerError, VideoLedger, VideoRecord};
pub use store::{ContentStore, HttpStore, MemoryStore, StoreError};
pub use upload::{UploadCoordinator, UploadError};
