/// Business logic services
pub mod ingestion;
pub mod streaming;

pub use ingestion::{IngestReceipt, IngestStage, IngestionPipeline, UploadEvent};
pub use streaming::{Disposition, MediaStream, StreamingGateway};
