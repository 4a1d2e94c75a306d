//! Track catalog
//!
//! The catalog is the single owner of all track records. Mutations take
//! the write lock for the whole read-modify-persist sequence, so two
//! increments on the same track never lose an update and two creates
//! never hand out the same id. Reads share the lock and see a consistent
//! snapshot.

use crate::search;
use crate::snapshot::{SnapshotFile, TrackMap};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use trackvault_core::{
    blob::BlobStore,
    error::{Result, VaultError},
    sanitize::{non_empty_display_text, UNKNOWN_ARTIST},
    types::{LibraryStats, NewTrack, Track, TrackId},
};

pub struct Catalog {
    tracks: RwLock<TrackMap>,
    snapshot: SnapshotFile,
    blobs: Arc<dyn BlobStore>,
    /// Set while the on-disk snapshot lags behind memory
    degraded: AtomicBool,
}

impl Catalog {
    /// Load the catalog from its snapshot
    ///
    /// A missing snapshot starts an empty catalog; a corrupt one is an error
    /// the caller must surface rather than discard.
    pub async fn open(snapshot: SnapshotFile, blobs: Arc<dyn BlobStore>) -> Result<Self> {
        let tracks = snapshot.load().await?;
        tracing::info!(
            "Loaded {} tracks from {:?}",
            tracks.len(),
            snapshot.path()
        );

        Ok(Self {
            tracks: RwLock::new(tracks),
            snapshot,
            blobs,
            degraded: AtomicBool::new(false),
        })
    }

    /// Register a new track and return the stored record
    pub async fn create(&self, new_track: NewTrack) -> Result<Track> {
        let title = non_empty_display_text(&new_track.title)
            .ok_or_else(|| VaultError::invalid_metadata("title is empty"))?;
        let artist = new_track
            .artist
            .as_deref()
            .and_then(non_empty_display_text)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let mut tracks = self.tracks.write().await;

        if tracks.values().any(|t| t.blob == new_track.blob) {
            return Err(VaultError::invalid_metadata(format!(
                "blob {} already belongs to a track",
                new_track.blob
            )));
        }

        let id = loop {
            let candidate = TrackId::generate();
            if !tracks.contains_key(&candidate) {
                break candidate;
            }
        };

        // Keep creation times non-decreasing in insertion order
        let now = Utc::now();
        let created_at = tracks
            .last()
            .map_or(now, |(_, last)| last.created_at.max(now));

        let track = Track {
            id: id.clone(),
            title,
            artist,
            external_ref: new_track.external_ref,
            blob: new_track.blob,
            duration_seconds: new_track.duration_seconds,
            uploader_id: new_track.uploader_id,
            created_at,
            play_count: 0,
        };
        tracks.insert(id.clone(), track.clone());

        if let Err(e) = self.persist(&tracks).await {
            tracks.shift_remove(&id);
            return Err(e);
        }

        tracing::info!("Registered track {}", id);
        Ok(track)
    }

    pub async fn get(&self, id: &TrackId) -> Result<Track> {
        self.tracks
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(id.clone()))
    }

    /// All tracks in insertion order
    pub async fn list(&self) -> Vec<Track> {
        self.tracks.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.tracks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tracks.read().await.is_empty()
    }

    /// Add one play and return the new count
    ///
    /// If the snapshot cannot be written the increment still stands in
    /// memory and the catalog is flagged degraded until a later write
    /// succeeds.
    pub async fn increment_play(&self, id: &TrackId) -> Result<u64> {
        let mut tracks = self.tracks.write().await;
        let track = tracks
            .get_mut(id)
            .ok_or_else(|| VaultError::NotFound(id.clone()))?;
        track.play_count += 1;
        let count = track.play_count;

        if let Err(e) = self.persist(&tracks).await {
            tracing::warn!("Play count for {} kept in memory only: {}", id, e);
        }
        Ok(count)
    }

    /// Remove a track and, best effort, its blob
    ///
    /// Returns `false` if the id was unknown.
    pub async fn delete(&self, id: &TrackId) -> Result<bool> {
        let removed = {
            let mut tracks = self.tracks.write().await;
            let Some(track) = tracks.shift_remove(id) else {
                return Ok(false);
            };
            if let Err(e) = self.persist(&tracks).await {
                tracing::warn!("Deletion of {} kept in memory only: {}", id, e);
            }
            track
        };

        match self.blobs.delete(&removed.blob).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                "Blob {} for deleted track {} was already gone",
                removed.blob,
                id
            ),
            Err(e) => tracing::error!(
                "Failed to delete blob {} for track {}: {}",
                removed.blob,
                id,
                e
            ),
        }

        tracing::info!("Deleted track {}", id);
        Ok(true)
    }

    /// Whether the last snapshot write failed
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        search::search(self.tracks.read().await.values(), query)
    }

    pub async fn stats(&self, top_n: usize) -> LibraryStats {
        search::stats(self.tracks.read().await.values(), top_n)
    }

    pub async fn recent(&self, n: usize) -> Vec<Track> {
        search::recent(self.tracks.read().await.values(), n)
    }

    /// Write the full snapshot, tracking the degraded flag
    async fn persist(&self, tracks: &TrackMap) -> Result<()> {
        match self.snapshot.write(tracks).await {
            Ok(()) => {
                if self.degraded.swap(false, Ordering::SeqCst) {
                    tracing::info!("Catalog snapshot caught up, no longer degraded");
                }
                Ok(())
            }
            Err(e) => {
                self.degraded.store(true, Ordering::SeqCst);
                tracing::error!(
                    "Failed to write catalog snapshot {:?}: {}",
                    self.snapshot.path(),
                    e
                );
                Err(VaultError::persistence(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("snapshot", &self.snapshot)
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}
