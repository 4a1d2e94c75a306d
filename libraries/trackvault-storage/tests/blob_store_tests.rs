/// Blob store tests
/// Tests writes, size limits, ranged reads and deletion on the filesystem store
use futures_util::StreamExt;
use std::sync::Arc;
use tempfile::TempDir;
use trackvault_core::{
    blob::{BlobReader, BlobStore, CHUNK_SIZE},
    error::VaultError,
    types::{BlobLocator, ByteRange},
};
use trackvault_storage::FsBlobStore;

async fn setup() -> (FsBlobStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = FsBlobStore::new(temp_dir.path().join("blobs"));
    storage.initialize().await.unwrap();
    (storage, temp_dir)
}

/// Drain a reader chunk by chunk, returning the chunk sizes and the bytes
async fn collect_chunks(reader: BlobReader) -> (Vec<usize>, Vec<u8>) {
    let mut stream = reader.into_chunks();
    let mut sizes = Vec::new();
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        sizes.push(chunk.len());
        data.extend_from_slice(&chunk);
    }
    (sizes, data)
}

/// Test initialization creates the blob directory
#[tokio::test]
async fn test_initialization_creates_directory() {
    let (storage, _temp_dir) = setup().await;
    assert!(storage.base_path().is_dir());
}

/// Test initialization clears out interrupted writes
#[tokio::test]
async fn test_initialization_removes_partial_writes() {
    let (storage, _temp_dir) = setup().await;
    let partial = storage.base_path().join("abc.mp3.part");
    std::fs::write(&partial, b"half").unwrap();

    storage.initialize().await.unwrap();
    assert!(!partial.exists());
}

/// Test written contents and extension
#[tokio::test]
async fn test_write_blob() {
    let (storage, _temp_dir) = setup().await;
    let file_data = b"fake audio data for testing";

    let locator = storage.write(file_data, "mp3", 1024).await.unwrap();

    assert_eq!(locator.extension(), Some("mp3"));
    let contents = std::fs::read(storage.base_path().join(locator.as_str())).unwrap();
    assert_eq!(contents, file_data);
}

/// Test each write gets a fresh locator
#[tokio::test]
async fn test_locators_are_unique() {
    let (storage, _temp_dir) = setup().await;

    let a = storage.write(b"same", "mp3", 1024).await.unwrap();
    let b = storage.write(b"same", "mp3", 1024).await.unwrap();

    assert_ne!(a, b);
    assert!(storage.exists(&a).await);
    assert!(storage.exists(&b).await);
}

/// Test payloads above the ceiling leave nothing behind
#[tokio::test]
async fn test_write_too_large() {
    let (storage, _temp_dir) = setup().await;

    let result = storage.write(&[0u8; 101], "mp3", 100).await;

    assert!(matches!(
        result,
        Err(VaultError::TooLarge {
            size: 101,
            limit: 100
        })
    ));
    let leftover = std::fs::read_dir(storage.base_path()).unwrap().count();
    assert_eq!(leftover, 0, "No file should be written");
}

/// Test a payload exactly at the ceiling is accepted
#[tokio::test]
async fn test_write_at_limit() {
    let (storage, _temp_dir) = setup().await;
    let locator = storage.write(&[7u8; 100], "mp3", 100).await.unwrap();
    assert_eq!(storage.size(&locator).await.unwrap(), 100);
}

/// Test reads stream in fixed-size chunks
#[tokio::test]
async fn test_read_in_chunks() {
    let (storage, _temp_dir) = setup().await;
    let data: Vec<u8> = (0..CHUNK_SIZE * 2 + 100).map(|i| (i % 251) as u8).collect();
    let locator = storage.write(&data, "flac", 1 << 20).await.unwrap();

    let reader = storage.open_for_read(&locator, None).await.unwrap();
    assert_eq!(reader.length(), data.len() as u64);
    let (sizes, read) = collect_chunks(reader).await;

    assert_eq!(read, data);
    assert!(sizes.iter().all(|s| *s <= CHUNK_SIZE));
    assert!(sizes.len() >= 3);
}

/// Test ranged reads return exactly the requested bytes
#[tokio::test]
async fn test_read_range() {
    let (storage, _temp_dir) = setup().await;
    let locator = storage.write(b"0123456789", "mp3", 1024).await.unwrap();

    let reader = storage
        .open_for_read(&locator, Some(ByteRange { start: 3, end: 6 }))
        .await
        .unwrap();

    assert_eq!(reader.length(), 4);
    assert_eq!(reader.total_size(), 10);
    assert_eq!(reader.read_to_end().await.unwrap(), b"3456");
}

/// Test ranges past the end are rejected
#[tokio::test]
async fn test_read_range_out_of_bounds() {
    let (storage, _temp_dir) = setup().await;
    let locator = storage.write(b"0123456789", "mp3", 1024).await.unwrap();

    let result = storage
        .open_for_read(&locator, Some(ByteRange { start: 5, end: 10 }))
        .await;

    assert!(matches!(
        result,
        Err(VaultError::RangeNotSatisfiable { size: 10 })
    ));
}

/// Test missing blobs report not found
#[tokio::test]
async fn test_open_missing_blob() {
    let (storage, _temp_dir) = setup().await;
    let locator = BlobLocator::new("does-not-exist.mp3");

    assert!(!storage.exists(&locator).await);
    assert!(matches!(
        storage.open_for_read(&locator, None).await,
        Err(VaultError::BlobNotFound(_))
    ));
    assert!(matches!(
        storage.size(&locator).await,
        Err(VaultError::BlobNotFound(_))
    ));
}

/// Test deletion is idempotent
#[tokio::test]
async fn test_delete_blob() {
    let (storage, _temp_dir) = setup().await;
    let locator = storage.write(b"data", "mp3", 1024).await.unwrap();

    assert!(storage.delete(&locator).await.unwrap());
    assert!(!storage.exists(&locator).await);
    assert!(!storage.delete(&locator).await.unwrap());
}

/// Test locators cannot escape the blob directory
#[tokio::test]
async fn test_traversal_locator_is_never_resolved() {
    let (storage, temp_dir) = setup().await;
    let outside = temp_dir.path().join("secret.txt");
    std::fs::write(&outside, b"secret").unwrap();

    let locator = BlobLocator::new("../secret.txt");
    assert!(!storage.exists(&locator).await);
    assert!(storage.open_for_read(&locator, None).await.is_err());
    assert!(!storage.delete(&locator).await.unwrap());
    assert!(outside.exists());
}

/// Test an open reader keeps working after the blob is deleted
#[tokio::test]
async fn test_reader_survives_delete() {
    let (storage, _temp_dir) = setup().await;
    let locator = storage.write(b"still here", "mp3", 1024).await.unwrap();

    let reader = storage.open_for_read(&locator, None).await.unwrap();
    storage.delete(&locator).await.unwrap();

    assert_eq!(reader.read_to_end().await.unwrap(), b"still here");
}

/// Test concurrent writes
#[tokio::test]
async fn test_concurrent_writes() {
    let (storage, _temp_dir) = setup().await;
    let storage = Arc::new(storage);

    let mut handles = vec![];
    for i in 0..10 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            let data = format!("data for track {}", i).into_bytes();
            storage.write(&data, "mp3", 1024).await
        }));
    }

    let mut locators = vec![];
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "Concurrent write should succeed");
        locators.push(result.unwrap());
    }

    for locator in &locators {
        assert!(storage.exists(locator).await);
    }
}
