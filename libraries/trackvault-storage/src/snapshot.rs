//! Catalog snapshot file
//!
//! The whole catalog is serialized as one JSON object mapping track id to
//! track record. Writes go to a sibling temporary file which is synced and
//! then renamed over the snapshot, so readers only ever see a complete
//! previous or complete new snapshot.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use trackvault_core::{
    error::{Result, VaultError},
    types::{Track, TrackId},
};

/// Track records keyed by id, in insertion order
pub(crate) type TrackMap = IndexMap<TrackId, Track>;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the ownership lock for this snapshot
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Location of the in-progress write
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Load the snapshot
    ///
    /// A missing file yields an empty catalog. A file that cannot be parsed,
    /// or whose records contradict each other, is `CorruptSnapshot`.
    /// A leftover temporary file from an interrupted write is discarded.
    pub(crate) async fn load(&self) -> Result<TrackMap> {
        let temp_path = self.temp_path();
        if fs::try_exists(&temp_path).await.unwrap_or(false) {
            tracing::warn!(
                "Discarding interrupted snapshot write at {:?}",
                temp_path
            );
            fs::remove_file(&temp_path).await?;
        }

        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No snapshot at {:?}, starting empty", self.path);
                return Ok(TrackMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        let tracks: TrackMap = serde_json::from_slice(&bytes)
            .map_err(|e| VaultError::corrupt_snapshot(&self.path, e.to_string()))?;

        self.check_consistency(&tracks)?;
        Ok(tracks)
    }

    fn check_consistency(&self, tracks: &TrackMap) -> Result<()> {
        let mut blobs = HashSet::with_capacity(tracks.len());
        for (key, track) in tracks {
            if *key != track.id {
                return Err(VaultError::corrupt_snapshot(
                    &self.path,
                    format!("entry {} holds record for {}", key, track.id),
                ));
            }
            if !blobs.insert(&track.blob) {
                return Err(VaultError::corrupt_snapshot(
                    &self.path,
                    format!("blob {} referenced by more than one track", track.blob),
                ));
            }
        }
        Ok(())
    }

    /// Durably replace the snapshot with `tracks`
    pub(crate) async fn write(&self, tracks: &TrackMap) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(tracks)?;
        self.stage(&bytes).await?;
        self.commit().await
    }

    /// Write `bytes` to the temporary file and sync it to disk
    pub async fn stage(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Atomically move the staged temporary file over the snapshot
    pub async fn commit(&self) -> Result<()> {
        fs::rename(self.temp_path(), &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use trackvault_core::types::BlobLocator;

    fn track(id: &str, blob: &str) -> Track {
        Track {
            id: TrackId::new(id),
            title: "Title".to_string(),
            artist: "Artist".to_string(),
            external_ref: String::new(),
            blob: BlobLocator::new(blob),
            duration_seconds: 0,
            uploader_id: None,
            created_at: Utc::now(),
            play_count: 0,
        }
    }

    #[tokio::test]
    async fn test_missing_snapshot_loads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(temp_dir.path().join("tracks.json"));
        assert!(snapshot.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_load_keeps_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(temp_dir.path().join("tracks.json"));

        let mut tracks = TrackMap::new();
        for (id, blob) in [("zz", "1.mp3"), ("aa", "2.mp3"), ("mm", "3.mp3")] {
            tracks.insert(TrackId::new(id), track(id, blob));
        }
        snapshot.write(&tracks).await.unwrap();

        let loaded = snapshot.load().await.unwrap();
        let ids: Vec<&str> = loaded.keys().map(TrackId::as_str).collect();
        assert_eq!(ids, vec!["zz", "aa", "mm"]);
        assert!(!snapshot.temp_path().exists());
    }

    #[tokio::test]
    async fn test_mismatched_key_is_corrupt() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(temp_dir.path().join("tracks.json"));

        let mut tracks = TrackMap::new();
        tracks.insert(TrackId::new("key"), track("other", "1.mp3"));
        snapshot.write(&tracks).await.unwrap();

        let err = snapshot.load().await.unwrap_err();
        assert!(matches!(err, VaultError::CorruptSnapshot { .. }));
    }

    #[tokio::test]
    async fn test_shared_blob_is_corrupt() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(temp_dir.path().join("tracks.json"));

        let mut tracks = TrackMap::new();
        tracks.insert(TrackId::new("a"), track("a", "same.mp3"));
        tracks.insert(TrackId::new("b"), track("b", "same.mp3"));
        snapshot.write(&tracks).await.unwrap();

        let err = snapshot.load().await.unwrap_err();
        assert!(matches!(err, VaultError::CorruptSnapshot { .. }));
    }
}
