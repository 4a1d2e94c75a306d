/// Server error types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use trackvault_core::VaultError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Vault(err) => match err {
                VaultError::InvalidMetadata(_)
                | VaultError::InvalidQuery(_)
                | VaultError::NotAudio => StatusCode::BAD_REQUEST,
                VaultError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                VaultError::NotFound(_)
                | VaultError::FileMissing(_)
                | VaultError::BlobNotFound(_) => StatusCode::NOT_FOUND,
                VaultError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
                VaultError::RegistrationFailure(_)
                | VaultError::PersistenceFailure(_)
                | VaultError::CorruptSnapshot { .. }
                | VaultError::CatalogLocked { .. }
                | VaultError::Io(_)
                | VaultError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) | ServerError::Config(_) | ServerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to callers; internal details stay in the logs
    fn public_message(&self) -> String {
        match self {
            ServerError::Vault(err) => match err {
                VaultError::NotFound(_) => "Track not found".to_string(),
                VaultError::FileMissing(_) | VaultError::BlobNotFound(_) => {
                    "Audio file not found".to_string()
                }
                VaultError::RegistrationFailure(_) => "Failed to register track".to_string(),
                VaultError::PersistenceFailure(_)
                | VaultError::CorruptSnapshot { .. }
                | VaultError::CatalogLocked { .. }
                | VaultError::Io(_)
                | VaultError::Serialization(_) => "Storage error".to_string(),
                other => other.to_string(),
            },
            ServerError::BadRequest(msg) => msg.clone(),
            ServerError::Internal(_) => "Internal server error".to_string(),
            ServerError::Config(_) => "Configuration error".to_string(),
            ServerError::Io(_) => "IO error".to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("{}: {:?}", status, self);
        } else if matches!(self, ServerError::Vault(VaultError::FileMissing(_))) {
            tracing::warn!("Data integrity: {}", self);
        }

        let body = Json(json!({
            "error": self.public_message(),
        }));

        let mut response = (status, body).into_response();
        if let ServerError::Vault(VaultError::RangeNotSatisfiable { size }) = self {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
