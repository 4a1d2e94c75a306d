/// Read side of the library: listings, lookups and audio streams
use crate::media::mime_for_extension;
use std::sync::Arc;
use trackvault_core::{
    blob::{BlobReader, BlobStore},
    error::{Result, VaultError},
    sanitize::filename_part,
    types::{LibraryStats, PublicTrack, RangeSpec, Track, TrackId},
};
use trackvault_storage::Catalog;

const FALLBACK_EXTENSION: &str = "mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Played in the browser
    Inline,
    /// Saved to disk
    Attachment,
}

/// An open audio stream plus the headers needed to serve it
#[derive(Debug)]
pub struct MediaStream {
    pub reader: BlobReader,
    pub mime_type: String,
    pub disposition: Disposition,
    pub filename: String,
}

impl MediaStream {
    /// `Content-Disposition` value for this stream
    ///
    /// The quoted `filename` is always plain ASCII. Names with other
    /// characters also get a percent-encoded `filename*` (RFC 6266).
    pub fn content_disposition(&self) -> String {
        let kind = match self.disposition {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        };
        let ascii: String = self
            .filename
            .chars()
            .map(|c| match c {
                '"' | '\\' => '_',
                c if c.is_ascii() && !c.is_ascii_control() => c,
                _ => '_',
            })
            .collect();

        if ascii == self.filename {
            format!("{}; filename=\"{}\"", kind, ascii)
        } else {
            format!(
                "{}; filename=\"{}\"; filename*=UTF-8''{}",
                kind,
                ascii,
                urlencoding::encode(&self.filename)
            )
        }
    }
}

pub struct StreamingGateway {
    catalog: Arc<Catalog>,
    blobs: Arc<dyn BlobStore>,
}

impl StreamingGateway {
    pub fn new(catalog: Arc<Catalog>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { catalog, blobs }
    }

    /// Open a track for playback, counting one play
    ///
    /// The play is only counted once the blob is known to exist and the
    /// requested range fits it.
    pub async fn play(&self, id: &TrackId, range: Option<RangeSpec>) -> Result<MediaStream> {
        self.open(id, range, Disposition::Inline).await
    }

    /// Open a track for download; downloads are not counted as plays
    pub async fn download(&self, id: &TrackId, range: Option<RangeSpec>) -> Result<MediaStream> {
        self.open(id, range, Disposition::Attachment).await
    }

    pub async fn list_public(&self) -> Vec<PublicTrack> {
        self.catalog
            .list()
            .await
            .into_iter()
            .map(PublicTrack::from)
            .collect()
    }

    pub async fn track_info(&self, id: &TrackId) -> Result<PublicTrack> {
        self.catalog.get(id).await.map(PublicTrack::from)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PublicTrack>> {
        let tracks = self.catalog.search(query).await?;
        Ok(tracks.into_iter().map(PublicTrack::from).collect())
    }

    pub async fn recent(&self, n: usize) -> Vec<PublicTrack> {
        self.catalog
            .recent(n)
            .await
            .into_iter()
            .map(PublicTrack::from)
            .collect()
    }

    pub async fn stats(&self, top_n: usize) -> LibraryStats {
        self.catalog.stats(top_n).await
    }

    async fn open(
        &self,
        id: &TrackId,
        range: Option<RangeSpec>,
        disposition: Disposition,
    ) -> Result<MediaStream> {
        let track = self.catalog.get(id).await?;

        let size = match self.blobs.size(&track.blob).await {
            Ok(size) => size,
            Err(e) => return Err(file_missing(e, &track)),
        };

        let byte_range = match range {
            Some(spec) => Some(
                spec.resolve(size)
                    .ok_or(VaultError::RangeNotSatisfiable { size })?,
            ),
            None => None,
        };

        let reader = self
            .blobs
            .open_for_read(&track.blob, byte_range)
            .await
            .map_err(|e| file_missing(e, &track))?;

        if disposition == Disposition::Inline {
            let plays = self.catalog.increment_play(id).await?;
            tracing::debug!("Playing {} (play #{})", id, plays);
        }

        let extension = track.blob.extension().unwrap_or(FALLBACK_EXTENSION);
        let filename = match disposition {
            Disposition::Inline => format!("{}.{}", filename_part(&track.title), extension),
            Disposition::Attachment => format!(
                "{} - {}.{}",
                filename_part(&track.artist),
                filename_part(&track.title),
                extension
            ),
        };

        Ok(MediaStream {
            reader,
            mime_type: mime_for_extension(track.blob.extension()),
            disposition,
            filename,
        })
    }
}

/// A catalog entry whose blob is gone is reported against the track
fn file_missing(err: VaultError, track: &Track) -> VaultError {
    match err {
        VaultError::BlobNotFound(locator) => {
            tracing::warn!(
                "Track {} references missing blob {}",
                track.id,
                locator
            );
            VaultError::FileMissing(track.id.clone())
        }
        other => other,
    }
}
