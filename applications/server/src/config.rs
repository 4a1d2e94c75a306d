/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upload ceiling: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_ingest")]
    pub ingest: IngestSettings,

    #[serde(default = "default_stats")]
    pub stats: StatsSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for the playback/download links handed back after ingestion
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Upper bound on requests served at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    #[serde(default = "default_blob_dir")]
    pub blob_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestSettings {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsSettings {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl StorageSettings {
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn blob_path(&self) -> PathBuf {
        self.data_dir.join(&self.blob_dir)
    }
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// `path` overrides the default `config.toml` in the working directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (TRACKVAULT_SERVER__PORT=9000)
        settings = settings.add_source(
            config::Environment::with_prefix("TRACKVAULT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ingest.max_upload_bytes == 0 {
            return Err(ServerError::Config(
                "ingest.max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        if self.ingest.queue_capacity == 0 {
            return Err(ServerError::Config(
                "ingest.queue_capacity must be greater than zero".to_string(),
            ));
        }

        if self.stats.top_n == 0 {
            return Err(ServerError::Config(
                "stats.top_n must be greater than zero".to_string(),
            ));
        }

        if self.server.max_concurrent_requests == 0 {
            return Err(ServerError::Config(
                "server.max_concurrent_requests must be greater than zero".to_string(),
            ));
        }

        if self.storage.snapshot_file.trim().is_empty() {
            return Err(ServerError::Config(
                "storage.snapshot_file must not be empty".to_string(),
            ));
        }

        if self.storage.snapshot_file == self.storage.blob_dir {
            return Err(ServerError::Config(
                "storage.snapshot_file and storage.blob_dir must differ".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        public_base_url: default_public_base_url(),
        max_concurrent_requests: default_max_concurrent_requests(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_public_base_url() -> String {
    "http://localhost:10000".to_string()
}

fn default_max_concurrent_requests() -> usize {
    64
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
        snapshot_file: default_snapshot_file(),
        blob_dir: default_blob_dir(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./music")
}

fn default_snapshot_file() -> String {
    "tracks.json".to_string()
}

fn default_blob_dir() -> String {
    "blobs".to_string()
}

fn default_ingest() -> IngestSettings {
    IngestSettings {
        max_upload_bytes: default_max_upload_bytes(),
        queue_capacity: default_queue_capacity(),
    }
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_queue_capacity() -> usize {
    32
}

fn default_stats() -> StatsSettings {
    StatsSettings {
        top_n: default_top_n(),
    }
}

fn default_top_n() -> usize {
    trackvault_storage::search::DEFAULT_TOP_N
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            ingest: default_ingest(),
            stats: default_stats(),
        }
    }
}
