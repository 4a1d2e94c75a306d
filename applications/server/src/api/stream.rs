/// Audio playback and download routes
use crate::{
    error::{Result, ServerError},
    services::{Disposition, MediaStream},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use trackvault_core::types::{RangeSpec, TrackId};

/// GET /api/play/:id
/// Stream a track inline with range request support; counts one play
pub async fn play_track(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let media = app_state
        .gateway
        .play(&TrackId::new(id), requested_range(&headers))
        .await?;
    media_response(media)
}

/// GET /api/download/:id
/// Stream a track as an attachment
pub async fn download_track(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let media = app_state
        .gateway
        .download(&TrackId::new(id), requested_range(&headers))
        .await?;
    media_response(media)
}

/// A Range header we cannot parse is ignored and the whole file is sent
fn requested_range(headers: &HeaderMap) -> Option<RangeSpec> {
    headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(RangeSpec::parse)
}

fn media_response(media: MediaStream) -> Result<Response> {
    let disposition = content_disposition_header(&media);
    let length = media.reader.length();
    let range = media.reader.range();
    let total = media.reader.total_size();

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, media.mime_type.as_str())
        .header(header::CONTENT_LENGTH, length)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_DISPOSITION, disposition);

    builder = match range {
        Some(range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, range.content_range(total)),
        None => builder.status(StatusCode::OK),
    };

    let body = Body::from_stream(media.reader.into_chunks());
    builder
        .body(body)
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

/// The disposition value is pure ASCII, so conversion only fails on a bug
fn content_disposition_header(media: &MediaStream) -> HeaderValue {
    HeaderValue::from_str(&media.content_disposition()).unwrap_or_else(|e| {
        tracing::warn!("Unusable Content-Disposition for {:?}: {}", media.filename, e);
        match media.disposition {
            Disposition::Inline => HeaderValue::from_static("inline"),
            Disposition::Attachment => HeaderValue::from_static("attachment"),
        }
    })
}
