//! Trackvault Storage
//!
//! Durable storage for the track library: audio blobs on the local
//! filesystem and the track catalog persisted as a single JSON snapshot.
//!
//! # Architecture
//!
//! - **Blob Store**: [`FsBlobStore`] writes each upload once under a fresh
//!   locator and streams it back in fixed-size chunks
//! - **Catalog**: [`Catalog`] owns every track record behind a single
//!   writer lock and rewrites the snapshot atomically on each mutation
//! - **Lock**: [`CatalogLock`] marks a catalog as owned by one process so
//!   maintenance tools never rewrite a snapshot a running server owns
//! - **Search & Stats**: [`search`] derives search results, rankings and
//!   totals from a catalog snapshot without keeping state of its own
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trackvault_core::types::{BlobLocator, NewTrack};
//! use trackvault_storage::{Catalog, FsBlobStore, SnapshotFile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let blobs = FsBlobStore::new("./music/blobs".into());
//! blobs.initialize().await?;
//!
//! let catalog = Catalog::open(SnapshotFile::new("./music/tracks.json"), Arc::new(blobs)).await?;
//! let track = catalog
//!     .create(NewTrack::new("Song A", BlobLocator::new("0123abcd.mp3")))
//!     .await?;
//! catalog.increment_play(&track.id).await?;
//! # Ok(())
//! # }
//! ```

mod blob_store;
mod catalog;
mod lock;
pub mod search;
mod snapshot;

pub use blob_store::FsBlobStore;
pub use catalog::Catalog;
pub use lock::CatalogLock;
pub use snapshot::SnapshotFile;
