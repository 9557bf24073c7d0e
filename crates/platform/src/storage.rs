//! Storage abstraction for the video filesystem.
//!
//! Models the slice of a FAT volume the player actually uses: open a file by
//! path, read sequentially, seek, and hand the volume back when the session
//! ends. Every operation can fail with an implementation-specific status
//! code; callers treat any failure as fatal for the current operation and do
//! not retry.

use core::future::Future;

/// A mounted volume that can open files for reading.
pub trait Storage {
    /// Filesystem status code.
    type Error: core::fmt::Debug;
    /// Open-file handle type.
    type File: File;

    /// Open a file for reading. `path` may contain `/`-separated directory
    /// components relative to the volume root.
    fn open_file(&mut self, path: &str)
        -> impl Future<Output = Result<Self::File, Self::Error>>;

    /// Check whether a path exists.
    fn exists(&mut self, path: &str) -> impl Future<Output = Result<bool, Self::Error>>;

    /// Release the volume (unmount). Idempotent; called once per playback
    /// session on every exit path. After release, `open_file` fails.
    fn release(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
}

/// An open file.
///
/// Dropping a `File` releases its handle; there is no explicit close.
pub trait File {
    /// Filesystem status code.
    type Error: core::fmt::Debug;

    /// Read from the current position. Returns the number of bytes read;
    /// `0` means end of file.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>>;

    /// Seek to an absolute position from the start of the file.
    fn seek(&mut self, pos: u64) -> impl Future<Output = Result<u64, Self::Error>>;

    /// File size in bytes.
    fn size(&self) -> u64;
}
