//! Trackvault Server Library
//!
//! HTTP front end for the track library: upload ingestion, catalog
//! queries, and inline or attachment audio streaming.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod media;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use jobs::IngestionQueue;
pub use media::AudioFormat;
pub use services::{IngestionPipeline, StreamingGateway};
pub use state::AppState;
