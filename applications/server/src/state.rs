/// Shared application state
use crate::{
    config::ServerConfig,
    error::Result,
    jobs::IngestionQueue,
    services::{IngestionPipeline, StreamingGateway},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use trackvault_core::blob::BlobStore;
use trackvault_storage::{Catalog, CatalogLock, FsBlobStore, SnapshotFile};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub gateway: Arc<StreamingGateway>,
    pub ingest_queue: IngestionQueue,
    pub config: Arc<ServerConfig>,
    /// Held for as long as any clone of the state is alive
    pub catalog_lock: Arc<CatalogLock>,
}

impl AppState {
    /// Open storage and start the ingestion worker
    ///
    /// Fails if the snapshot is corrupt or another process holds the
    /// catalog lock; the returned handle belongs to the ingestion worker.
    pub async fn initialize(config: ServerConfig) -> Result<(Self, JoinHandle<()>)> {
        let snapshot = SnapshotFile::new(config.storage.snapshot_path());
        let catalog_lock = Arc::new(CatalogLock::acquire(snapshot.lock_path()).await?);
        tracing::debug!("Catalog lock taken at {:?}", catalog_lock.path());

        let blob_store = FsBlobStore::new(config.storage.blob_path());
        blob_store.initialize().await?;
        let blobs: Arc<dyn BlobStore> = Arc::new(blob_store);
        tracing::info!("Blob storage initialized at {:?}", config.storage.blob_path());

        let catalog = Arc::new(Catalog::open(snapshot, Arc::clone(&blobs)).await?);

        let gateway = Arc::new(StreamingGateway::new(
            Arc::clone(&catalog),
            Arc::clone(&blobs),
        ));

        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::clone(&catalog),
            blobs,
            config.ingest.max_upload_bytes,
            config.server.public_base_url.clone(),
        ));
        let (ingest_queue, worker) =
            IngestionQueue::start(pipeline, config.ingest.queue_capacity);

        Ok((
            Self {
                catalog,
                gateway,
                ingest_queue,
                config: Arc::new(config),
                catalog_lock,
            },
            worker,
        ))
    }
}
