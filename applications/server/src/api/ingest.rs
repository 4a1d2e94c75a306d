/// Upload route feeding the ingestion queue
use crate::{
    error::{Result, ServerError},
    services::{IngestReceipt, UploadEvent},
    state::AppState,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use bytes::BytesMut;
use multer::{Constraints, SizeLimit};
use trackvault_core::error::VaultError;

/// Ceiling for each text part (title, performer, references, numbers)
pub const MAX_TEXT_FIELD_BYTES: u64 = 4 * 1024;

/// Room for part headers and text parts on top of the audio itself
const FORM_OVERHEAD_BYTES: u64 = 64 * 1024;

/// POST /api/ingest
///
/// Multipart form with a `file` part holding the audio plus optional text
/// parts `title`, `performer`, `duration`, `external_ref`, `sender_id` and
/// `declared_size`. The file part is rejected as soon as it grows past the
/// configured upload ceiling, text parts past [`MAX_TEXT_FIELD_BYTES`].
/// Only one file part is accepted per form.
pub async fn ingest_track(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<IngestReceipt>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ServerError::BadRequest("Expected multipart/form-data".to_string()))?;

    let limit = app_state.config.ingest.max_upload_bytes;
    let constraints = Constraints::new().size_limit(
        SizeLimit::new()
            .whole_stream(limit.saturating_add(FORM_OVERHEAD_BYTES))
            .per_field(MAX_TEXT_FIELD_BYTES)
            .for_field("file", limit.saturating_add(1)),
    );
    let mut multipart =
        multer::Multipart::with_constraints(body.into_data_stream(), boundary, constraints);
    let mut event = UploadEvent::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", limit))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                if event.payload.is_some() {
                    return Err(ServerError::BadRequest(
                        "Only one file part is allowed".to_string(),
                    ));
                }
                event.file_name = field.file_name().map(str::to_string);
                event.mime_type = field.content_type().map(ToString::to_string);

                let mut data = BytesMut::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file", limit))?
                {
                    let size = (data.len() + chunk.len()) as u64;
                    if size > limit {
                        return Err(VaultError::TooLarge { size, limit }.into());
                    }
                    data.extend_from_slice(&chunk);
                }
                event.payload = Some(data.freeze());
            }
            "title" => event.title = Some(text_field(field, limit).await?),
            "performer" | "artist" => event.performer = Some(text_field(field, limit).await?),
            "duration" => {
                let value = text_field(field, limit).await?;
                event.duration_seconds = Some(parse_number(&value, "duration")?);
            }
            "external_ref" => event.external_ref = text_field(field, limit).await?,
            "sender_id" => event.sender_id = Some(text_field(field, limit).await?),
            "declared_size" => {
                let value = text_field(field, limit).await?;
                event.declared_size = Some(parse_number(&value, "declared_size")?);
            }
            _ => {
                tracing::debug!("Ignoring unknown multipart field {:?}", name);
            }
        }
    }

    let receipt = app_state.ingest_queue.submit(event).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn text_field(field: multer::Field<'_>, limit: u64) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| multipart_error(e, "Failed to read field", limit))
}

/// Oversized text parts are bad requests; an oversized form or file part is
/// reported against the upload ceiling.
fn multipart_error(err: multer::Error, context: &str, limit: u64) -> ServerError {
    match err {
        multer::Error::FieldSizeExceeded { field_name, .. }
            if field_name.as_deref() == Some("file") =>
        {
            VaultError::TooLarge {
                size: limit.saturating_add(1),
                limit,
            }
            .into()
        }
        multer::Error::FieldSizeExceeded { limit: field_limit, field_name } => {
            ServerError::BadRequest(format!(
                "Field {:?} exceeds {} bytes",
                field_name.unwrap_or_default(),
                field_limit
            ))
        }
        multer::Error::StreamSizeExceeded { limit: stream_limit } => VaultError::TooLarge {
            size: stream_limit,
            limit,
        }
        .into(),
        other => ServerError::BadRequest(format!("{}: {}", context, other)),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("Invalid {}: {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_text_field_is_bad_request() {
        let err = multipart_error(
            multer::Error::FieldSizeExceeded {
                limit: MAX_TEXT_FIELD_BYTES,
                field_name: Some("title".to_string()),
            },
            "Failed to read field",
            64,
        );
        assert!(matches!(err, ServerError::BadRequest(msg) if msg.contains("title")));
    }

    #[test]
    fn test_oversized_form_is_too_large() {
        let err = multipart_error(
            multer::Error::StreamSizeExceeded { limit: 1024 },
            "Failed to parse multipart",
            64,
        );
        assert!(matches!(
            err,
            ServerError::Vault(VaultError::TooLarge { limit: 64, .. })
        ));

        let err = multipart_error(
            multer::Error::FieldSizeExceeded {
                limit: 65,
                field_name: Some("file".to_string()),
            },
            "Failed to read file",
            64,
        );
        assert!(matches!(
            err,
            ServerError::Vault(VaultError::TooLarge { size: 65, limit: 64 })
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u32>(" 215 ", "duration").unwrap(), 215);
        assert!(parse_number::<u64>("lots", "declared_size").is_err());
        assert!(parse_number::<u32>("-1", "duration").is_err());
    }
}
