/// Bounded queue between inbound uploads and the ingestion pipeline
use crate::{
    error::{Result, ServerError},
    services::{IngestReceipt, IngestionPipeline, UploadEvent},
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use trackvault_core::error::VaultError;

struct IngestJob {
    event: UploadEvent,
    reply: oneshot::Sender<std::result::Result<IngestReceipt, VaultError>>,
}

/// Handle for submitting uploads; cheap to clone
///
/// Uploads are processed one at a time in arrival order. When the queue
/// is full, `submit` waits for room.
#[derive(Clone)]
pub struct IngestionQueue {
    sender: mpsc::Sender<IngestJob>,
}

impl IngestionQueue {
    /// Spawn the worker task and return the submitting handle
    ///
    /// The worker stops once every handle has been dropped.
    pub fn start(pipeline: Arc<IngestionPipeline>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(worker_loop(pipeline, receiver));
        tracing::info!("Ingestion queue started (capacity {})", capacity);
        (Self { sender }, worker)
    }

    /// Queue an upload and wait for its outcome
    pub async fn submit(&self, event: UploadEvent) -> Result<IngestReceipt> {
        let (reply, outcome) = oneshot::channel();
        self.sender
            .send(IngestJob { event, reply })
            .await
            .map_err(|_| ServerError::Internal("Ingestion worker has stopped".to_string()))?;

        outcome
            .await
            .map_err(|_| ServerError::Internal("Ingestion job was dropped".to_string()))?
            .map_err(ServerError::from)
    }
}

async fn worker_loop(pipeline: Arc<IngestionPipeline>, mut receiver: mpsc::Receiver<IngestJob>) {
    while let Some(job) = receiver.recv().await {
        let outcome = pipeline.ingest(job.event).await;
        if let Err(e) = &outcome {
            tracing::debug!("Ingestion failed: {}", e);
        }
        // The submitter may have gone away; the outcome is already logged.
        let _ = job.reply.send(outcome);
    }
    tracing::info!("Ingestion queue closed");
}
