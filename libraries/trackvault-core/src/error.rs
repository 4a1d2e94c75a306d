/// Core error types for Trackvault
use crate::types::{BlobLocator, TrackId};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `VaultError`
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for Trackvault
///
/// Every variant is recoverable at the service boundary except
/// [`VaultError::CorruptSnapshot`], which aborts startup.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Track metadata rejected (e.g. empty title after sanitization)
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Search query rejected
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Unknown track id
    #[error("Track not found: {0}")]
    NotFound(TrackId),

    /// Upload exceeds the configured ceiling
    #[error("Upload too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// Upload carries no audio payload
    #[error("Upload is not an audio file")]
    NotAudio,

    /// Catalog references a blob that no longer exists
    #[error("Audio file missing for track {0}")]
    FileMissing(TrackId),

    /// Blob lookup failed inside the blob store
    #[error("Blob not found: {0}")]
    BlobNotFound(BlobLocator),

    /// Requested byte range lies outside the blob
    #[error("Range not satisfiable for blob of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    /// Catalog registration failed after the blob was written
    #[error("Registration failed: {0}")]
    RegistrationFailure(String),

    /// Snapshot could not be written
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Snapshot on disk could not be parsed
    #[error("Corrupt catalog snapshot at {path:?}: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },

    /// Another process owns the catalog
    #[error("Catalog at {path:?} is locked by process {}", .pid.map_or_else(|| "unknown".to_string(), |p| p.to_string()))]
    CatalogLocked { path: PathBuf, pid: Option<u32> },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl VaultError {
    /// Create an invalid metadata error
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create a persistence failure
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    /// Create a corrupt snapshot error
    pub fn corrupt_snapshot(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptSnapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means "nothing to serve" to a caller
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::FileMissing(_) | Self::BlobNotFound(_)
        )
    }
}
