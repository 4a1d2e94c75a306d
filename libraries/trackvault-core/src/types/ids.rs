/// ID types for Trackvault entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of a generated track identifier
pub const TRACK_ID_LEN: usize = 8;

/// Track identifier
///
/// Short opaque string; uniqueness is enforced by the catalog, which
/// re-draws on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random track ID
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(TRACK_ID_LEN);
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a stored blob
///
/// Only a [`BlobStore`](crate::BlobStore) knows how a locator maps onto
/// storage; everything else treats it as an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobLocator(String);

impl BlobLocator {
    /// Create a locator from its stored form
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Generate a fresh locator with the given file extension
    pub fn generate(extension: &str) -> Self {
        Self(format!("{}.{}", Uuid::new_v4().simple(), extension))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension carried by the locator, if any
    pub fn extension(&self) -> Option<&str> {
        self.0
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
