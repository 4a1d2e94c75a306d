//! Exclusive ownership of a catalog on disk
//!
//! The lock is a file next to the snapshot, created exclusively and
//! holding the owner's process id. It is removed when the guard drops.
//! A lock left behind by a process that no longer runs is reclaimed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use trackvault_core::error::{Result, VaultError};

#[derive(Debug)]
pub struct CatalogLock {
    path: PathBuf,
}

impl CatalogLock {
    /// Take the lock, failing with `CatalogLocked` if a live process holds it
    pub async fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        match create_lock_file(&path).await {
            Ok(()) => return Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        let holder = read_holder(&path).await;
        match holder {
            Some(pid) if !process_alive(pid) => {
                tracing::warn!(
                    "Reclaiming catalog lock {:?} left by process {}",
                    path,
                    pid
                );
                match fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
            _ => return Err(VaultError::CatalogLocked { path, pid: holder }),
        }

        match create_lock_file(&path).await {
            Ok(()) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let pid = read_holder(&path).await;
                Err(VaultError::CatalogLocked { path, pid })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Failed to release catalog lock {:?}: {}", self.path, e);
            }
        }
    }
}

async fn create_lock_file(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(std::process::id().to_string().as_bytes())
        .await?;
    file.sync_all().await
}

async fn read_holder(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).await.ok()?;
    contents.trim().parse().ok()
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

// Without a cheap liveness check every recorded holder counts as alive.
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lock_is_exclusive_until_dropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tracks.json.lock");

        let lock = CatalogLock::acquire(&path).await.unwrap();
        let holder = std::fs::read_to_string(&path).unwrap();
        assert_eq!(holder, std::process::id().to_string());

        let second = CatalogLock::acquire(&path).await;
        assert!(matches!(
            second,
            Err(VaultError::CatalogLocked { pid: Some(pid), .. }) if pid == std::process::id()
        ));

        drop(lock);
        assert!(!path.exists());
        assert!(CatalogLock::acquire(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreadable_holder_is_not_reclaimed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tracks.json.lock");
        std::fs::write(&path, b"not a pid").unwrap();

        let result = CatalogLock::acquire(&path).await;
        assert!(matches!(
            result,
            Err(VaultError::CatalogLocked { pid: None, .. })
        ));
        assert!(path.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_stale_lock_is_reclaimed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tracks.json.lock");
        // Above the kernel's pid_max, so no such process can exist
        std::fs::write(&path, b"4000000000").unwrap();

        let lock = CatalogLock::acquire(&path).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(lock.path()).unwrap(),
            std::process::id().to_string()
        );
    }
}
