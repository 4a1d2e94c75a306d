/// Background jobs
pub mod ingest_queue;

pub use ingest_queue::IngestionQueue;
