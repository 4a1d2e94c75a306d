//! Upload ingestion
//!
//! An upload moves through `Received -> Validated -> BlobWritten ->
//! Registered`. It ends early in `Rejected` when validation fails, or in
//! `RolledBack` when the catalog refuses the track after the blob was
//! written, in which case the blob is deleted again.

use crate::media::{is_audio_mime, AudioFormat};
use bytes::Bytes;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use trackvault_core::{
    blob::BlobStore,
    error::{Result, VaultError},
    sanitize::{non_empty_display_text, UNKNOWN_TITLE},
    types::{NewTrack, TrackId},
};
use trackvault_storage::Catalog;

/// One upload as delivered by the inbound transport
#[derive(Debug, Clone, Default)]
pub struct UploadEvent {
    /// Raw audio bytes; `None` when the message carried no audio
    pub payload: Option<Bytes>,
    /// Size claimed by the sender before the bytes were fetched
    pub declared_size: Option<u64>,
    pub external_ref: String,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub duration_seconds: Option<u32>,
    pub sender_id: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Validated,
    BlobWritten,
    Registered,
    Rejected,
    RolledBack,
}

/// Result of a successful ingestion, relayed back to the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub duration_seconds: u32,
    pub play_url: String,
    pub download_url: String,
}

pub struct IngestionPipeline {
    catalog: Arc<Catalog>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: u64,
    public_base_url: String,
}

impl IngestionPipeline {
    pub fn new(
        catalog: Arc<Catalog>,
        blobs: Arc<dyn BlobStore>,
        max_upload_bytes: u64,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            blobs,
            max_upload_bytes,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn play_url(&self, id: &TrackId) -> String {
        format!("{}/api/play/{}", self.public_base_url, id)
    }

    pub fn download_url(&self, id: &TrackId) -> String {
        format!("{}/api/download/{}", self.public_base_url, id)
    }

    /// Run one upload through the pipeline
    pub async fn ingest(&self, event: UploadEvent) -> Result<IngestReceipt> {
        log_stage(&event.external_ref, IngestStage::Received);

        let payload = match self.validate(&event) {
            Ok(payload) => payload,
            Err(e) => {
                log_stage(&event.external_ref, IngestStage::Rejected);
                tracing::info!("Rejected upload {:?}: {}", event.external_ref, e);
                return Err(e);
            }
        };
        log_stage(&event.external_ref, IngestStage::Validated);

        let extension = upload_extension(&event);
        let locator = self
            .blobs
            .write(&payload, &extension, self.max_upload_bytes)
            .await?;
        log_stage(&event.external_ref, IngestStage::BlobWritten);

        let title = upload_title(&event);
        let mut new_track = NewTrack::new(title, locator.clone())
            .with_external_ref(event.external_ref.clone())
            .with_duration(event.duration_seconds.unwrap_or(0));
        if let Some(performer) = &event.performer {
            new_track = new_track.with_artist(performer.clone());
        }
        if let Some(sender) = &event.sender_id {
            new_track = new_track.with_uploader(sender.clone());
        }

        let track = match self.catalog.create(new_track).await {
            Ok(track) => track,
            Err(e) => {
                tracing::warn!(
                    "Registration of upload {:?} failed: {}",
                    event.external_ref,
                    e
                );
                match self.blobs.delete(&locator).await {
                    Ok(_) => log_stage(&event.external_ref, IngestStage::RolledBack),
                    Err(del) => tracing::error!(
                        "Failed to remove orphaned blob {}: {}",
                        locator,
                        del
                    ),
                }
                return Err(VaultError::RegistrationFailure(e.to_string()));
            }
        };
        log_stage(&event.external_ref, IngestStage::Registered);

        tracing::info!(
            "Track uploaded: {} by {} (ID: {})",
            track.title,
            track.artist,
            track.id
        );

        Ok(IngestReceipt {
            play_url: self.play_url(&track.id),
            download_url: self.download_url(&track.id),
            id: track.id,
            title: track.title,
            artist: track.artist,
            duration_seconds: track.duration_seconds,
        })
    }

    fn validate(&self, event: &UploadEvent) -> Result<Bytes> {
        if let Some(declared) = event.declared_size {
            if declared > self.max_upload_bytes {
                return Err(VaultError::TooLarge {
                    size: declared,
                    limit: self.max_upload_bytes,
                });
            }
        }

        if event.mime_type.as_deref().is_some_and(|m| !is_audio_mime(m)) {
            return Err(VaultError::NotAudio);
        }

        let payload = match &event.payload {
            Some(payload) if !payload.is_empty() => payload.clone(),
            _ => return Err(VaultError::NotAudio),
        };

        let size = payload.len() as u64;
        if size > self.max_upload_bytes {
            return Err(VaultError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        Ok(payload)
    }
}

fn log_stage(external_ref: &str, stage: IngestStage) {
    tracing::debug!("Upload {:?} -> {:?}", external_ref, stage);
}

/// Title tag, else the file name without extension, else a placeholder
fn upload_title(event: &UploadEvent) -> String {
    event
        .title
        .as_deref()
        .and_then(non_empty_display_text)
        .or_else(|| {
            event
                .file_name
                .as_deref()
                .and_then(|name| Path::new(name).file_stem())
                .and_then(|stem| stem.to_str())
                .and_then(non_empty_display_text)
        })
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Extension for the stored blob, from the file name or declared MIME type
///
/// File name extensions are kept when they are short lower-case
/// alphanumerics, whether or not they name a known format.
fn upload_extension(event: &UploadEvent) -> String {
    event
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .or_else(|| {
            event
                .mime_type
                .as_deref()
                .and_then(AudioFormat::from_mime_type)
                .map(|format| format.extension().to_string())
        })
        .unwrap_or_else(|| AudioFormat::Mp3.extension().to_string())
}
