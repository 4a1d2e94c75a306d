//! Blob storage abstraction
//!
//! Audio bytes live behind [`BlobStore`] so the catalog never assumes a
//! particular filesystem layout. Reads are handed out as [`BlobReader`]s,
//! which own their file handle and stream in fixed-size chunks.

use crate::error::Result;
use crate::types::{BlobLocator, ByteRange};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::ReaderStream;

/// Chunk size for sequential blob reads
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Durable storage for raw audio bytes
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a new blob, failing with `TooLarge` if `data` exceeds `size_limit`
    ///
    /// The blob is fully written before the locator is returned.
    async fn write(&self, data: &[u8], extension: &str, size_limit: u64) -> Result<BlobLocator>;

    /// Check whether a blob exists
    async fn exists(&self, locator: &BlobLocator) -> bool;

    /// Size of a blob in bytes
    async fn size(&self, locator: &BlobLocator) -> Result<u64>;

    /// Open a blob for sequential reading, optionally restricted to a range
    async fn open_for_read(
        &self,
        locator: &BlobLocator,
        range: Option<ByteRange>,
    ) -> Result<BlobReader>;

    /// Delete a blob. Returns `false` if it did not exist.
    async fn delete(&self, locator: &BlobLocator) -> Result<bool>;
}

/// Open read handle on a blob
///
/// Dropping the reader releases the underlying handle, so an aborted
/// transfer never pins the file.
pub struct BlobReader {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    length: u64,
    total_size: u64,
    range: Option<ByteRange>,
}

impl BlobReader {
    pub fn new(
        reader: Box<dyn AsyncRead + Send + Unpin>,
        total_size: u64,
        range: Option<ByteRange>,
    ) -> Self {
        let length = range.map_or(total_size, |r| r.len());
        Self {
            reader,
            length,
            total_size,
            range,
        }
    }

    /// Number of bytes this reader yields
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Size of the whole blob
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Range being read, if this is a partial read
    pub fn range(&self) -> Option<ByteRange> {
        self.range
    }

    /// Stream the contents in [`CHUNK_SIZE`] chunks
    pub fn into_chunks(self) -> ReaderStream<Box<dyn AsyncRead + Send + Unpin>> {
        ReaderStream::with_capacity(self.reader, CHUNK_SIZE)
    }

    /// Read the remaining contents into memory
    pub async fn read_to_end(mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.length as usize);
        self.reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

impl std::fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobReader")
            .field("length", &self.length)
            .field("total_size", &self.total_size)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_length_follows_range() {
        let data: &'static [u8] = b"0123456789";
        let reader = BlobReader::new(
            Box::new(&data[2..=5]),
            10,
            Some(ByteRange { start: 2, end: 5 }),
        );
        assert_eq!(reader.length(), 4);
        assert_eq!(reader.total_size(), 10);
        assert_eq!(reader.read_to_end().await.unwrap(), b"2345");
    }
}
