//! Trackvault Core
//!
//! Domain types, the blob storage seam, and error handling shared by the
//! storage layer and the server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `NewTrack`, `PublicTrack`, `LibraryStats`
//! - **Identifiers**: `TrackId` and the opaque `BlobLocator`
//! - **Core Traits**: `BlobStore`, resolved only by storage implementations
//! - **Error Handling**: Unified `VaultError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use trackvault_core::types::{BlobLocator, NewTrack, TrackId};
//!
//! let id = TrackId::generate();
//! assert_eq!(id.as_str().len(), 8);
//!
//! let new_track = NewTrack::new("My Favorite Song", BlobLocator::generate("mp3"))
//!     .with_artist("Some Band")
//!     .with_external_ref("ext-1");
//! assert_eq!(new_track.artist.as_deref(), Some("Some Band"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod blob;
pub mod error;
pub mod sanitize;
pub mod types;

// Re-export commonly used types
pub use blob::{BlobReader, BlobStore, CHUNK_SIZE};
pub use error::{Result, VaultError};
pub use types::{
    BlobLocator, ByteRange, LibraryStats, NewTrack, PublicTrack, RangeSpec, TopTrack, Track,
    TrackId,
};
