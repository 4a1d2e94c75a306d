/// File storage for audio blobs - one file per locator in a flat directory
use async_trait::async_trait;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use trackvault_core::{
    blob::{BlobReader, BlobStore},
    error::{Result, VaultError},
    types::{BlobLocator, ByteRange},
};

/// Suffix of blobs still being written
const PARTIAL_SUFFIX: &str = ".part";

/// Extension used when the caller supplies an unusable one
const FALLBACK_EXTENSION: &str = "bin";

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Create the blob directory and clear out interrupted writes
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;

        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(PARTIAL_SUFFIX) {
                tracing::warn!("Removing interrupted blob write {:?}", entry.path());
                if let Err(e) = fs::remove_file(entry.path()).await {
                    tracing::error!("Failed to remove {:?}: {}", entry.path(), e);
                }
            }
        }
        Ok(())
    }

    /// Map a locator onto a path inside the blob directory
    ///
    /// Locators are plain file names; anything that could escape the
    /// directory resolves to nothing.
    fn resolve(&self, locator: &BlobLocator) -> Option<PathBuf> {
        let name = locator.as_str();
        let is_plain = !name.is_empty()
            && !name.starts_with('.')
            && !name.ends_with(PARTIAL_SUFFIX)
            && !name.contains(&['/', '\\', '\0'][..])
            && !name.contains("..");
        is_plain.then(|| self.base_path.join(name))
    }

    fn resolve_or_missing(&self, locator: &BlobLocator) -> Result<PathBuf> {
        self.resolve(locator)
            .ok_or_else(|| VaultError::BlobNotFound(locator.clone()))
    }

    async fn write_new(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let partial = partial_path(path);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&partial)
            .await?;

        let written = write_and_rename(file, &partial, path, data).await;
        if written.is_err() {
            let _ = fs::remove_file(&partial).await;
        }
        written
    }
}

async fn write_and_rename(
    mut file: File,
    partial: &Path,
    path: &Path,
    data: &[u8],
) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(partial, path).await
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, data: &[u8], extension: &str, size_limit: u64) -> Result<BlobLocator> {
        let size = data.len() as u64;
        if size > size_limit {
            return Err(VaultError::TooLarge {
                size,
                limit: size_limit,
            });
        }

        let extension = clean_extension(extension);
        let (locator, path) = loop {
            let locator = BlobLocator::generate(&extension);
            let path = self.resolve_or_missing(&locator)?;
            if !fs::try_exists(&path).await? {
                break (locator, path);
            }
        };

        self.write_new(&path, data).await?;
        tracing::debug!("Stored blob {} ({} bytes)", locator, size);
        Ok(locator)
    }

    async fn exists(&self, locator: &BlobLocator) -> bool {
        match self.resolve(locator) {
            Some(path) => fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            None => false,
        }
    }

    async fn size(&self, locator: &BlobLocator) -> Result<u64> {
        let path = self.resolve_or_missing(locator)?;
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
            Ok(_) => Err(VaultError::BlobNotFound(locator.clone())),
            Err(e) => Err(missing_or_io(e, locator)),
        }
    }

    async fn open_for_read(
        &self,
        locator: &BlobLocator,
        range: Option<ByteRange>,
    ) -> Result<BlobReader> {
        let path = self.resolve_or_missing(locator)?;
        let mut file = File::open(&path)
            .await
            .map_err(|e| missing_or_io(e, locator))?;
        let total_size = file.metadata().await?.len();

        match range {
            Some(range) => {
                if range.start > range.end || range.end >= total_size {
                    return Err(VaultError::RangeNotSatisfiable { size: total_size });
                }
                file.seek(SeekFrom::Start(range.start)).await?;
                Ok(BlobReader::new(
                    Box::new(file.take(range.len())),
                    total_size,
                    Some(range),
                ))
            }
            None => Ok(BlobReader::new(Box::new(file), total_size, None)),
        }
    }

    async fn delete(&self, locator: &BlobLocator) -> Result<bool> {
        let Some(path) = self.resolve(locator) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Lower-case alphanumeric extension of at most five characters
fn clean_extension(extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        FALLBACK_EXTENSION.to_string()
    } else {
        ext
    }
}

fn missing_or_io(err: std::io::Error, locator: &BlobLocator) -> VaultError {
    if err.kind() == ErrorKind::NotFound {
        VaultError::BlobNotFound(locator.clone())
    } else {
        VaultError::Io(err)
    }
}
