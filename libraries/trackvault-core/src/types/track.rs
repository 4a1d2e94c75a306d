//! Track record and its derived views

use super::ids::{BlobLocator, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored track: metadata plus the locator of its audio blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Identifier of the source object in the inbound transport
    pub external_ref: String,
    pub blob: BlobLocator,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub uploader_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub play_count: u64,
}

/// Metadata for registering a new track
///
/// Text fields are sanitized by the catalog on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub title: String,
    pub artist: Option<String>,
    pub external_ref: String,
    pub blob: BlobLocator,
    pub duration_seconds: u32,
    pub uploader_id: Option<String>,
}

impl NewTrack {
    pub fn new(title: impl Into<String>, blob: BlobLocator) -> Self {
        Self {
            title: title.into(),
            artist: None,
            external_ref: String::new(),
            blob,
            duration_seconds: 0,
            uploader_id: None,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[must_use]
    pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
        self.external_ref = external_ref.into();
        self
    }

    #[must_use]
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_uploader(mut self, uploader_id: impl Into<String>) -> Self {
        self.uploader_id = Some(uploader_id.into());
        self
    }
}

/// Caller-facing view of a track without storage internals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicTrack {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub duration_seconds: u32,
    pub uploader_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub play_count: u64,
}

impl From<&Track> for PublicTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration_seconds: track.duration_seconds,
            uploader_id: track.uploader_id.clone(),
            created_at: track.created_at,
            play_count: track.play_count,
        }
    }
}

impl From<Track> for PublicTrack {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            title: track.title,
            artist: track.artist,
            duration_seconds: track.duration_seconds,
            uploader_id: track.uploader_id,
            created_at: track.created_at,
            play_count: track.play_count,
        }
    }
}
