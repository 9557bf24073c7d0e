//! Local-filesystem [`Storage`] implementation for host tests and tooling.
//!
//! `LocalFileStorage` resolves paths relative to a root directory given at
//! construction, standing in for the SD card on the desktop. `release()` is a
//! no-op: there is nothing to unmount on a host filesystem.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use crate::storage::{File, Storage};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub struct LocalStorageError(pub std::io::Error);

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "local storage error: {}", self.0)
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        Seek::seek(&mut self.inner, SeekFrom::Start(pos)).map_err(LocalStorageError)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A [`Storage`] backed by `std::fs`, rooted at a directory.
///
/// # Example
/// ```no_run
/// # async fn example() {
/// use platform::storage_local::LocalFileStorage;
/// use platform::Storage;
/// let mut storage = LocalFileStorage::new("/home/user/sdcard");
/// let file = storage.open_file("vid/video.bin").await.unwrap();
/// # }
/// ```
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a storage rooted at `root`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type File = LocalFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::File::open(&full).map_err(LocalStorageError)?;
        let meta = file.metadata().map_err(LocalStorageError)?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
        })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.resolve(path).exists())
    }

    async fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
