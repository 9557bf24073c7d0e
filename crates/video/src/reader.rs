//! `VideoReader` — sequential frame extraction from a container file.
//!
//! Parameterised over any [`platform::Storage`] implementation. The reader
//! owns the open file for the session; dropping it releases the handle, so
//! every exit path — success, short read, desynchronisation — cleans up.
//!
//! The per-frame `"FRM"` marker is a cheap integrity guard against stream
//! corruption or an off-by-one in a prior read. On mismatch the reader fails
//! fast rather than scanning for realignment: frame cadence matters more
//! than salvaging a corrupt stream.

use platform::storage::{File, Storage};

use crate::format::{VideoHeader, FRAME_MARKER};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Error from `VideoReader` operations.
///
/// `E` is the storage status code. None of these are retried: filesystem
/// failures and stream corruption both abort the playback session.
#[derive(Debug)]
pub enum ReaderError<E: core::fmt::Debug> {
    /// The container file could not be opened.
    Open(E),
    /// I/O error from the underlying storage while reading.
    Io(E),
    /// End of file before the 6-byte header was complete.
    HeaderShort {
        /// Bytes actually read.
        got: usize,
    },
    /// File size does not equal `6 + frame_count * record_len` exactly.
    Length {
        /// Size a well-formed container with this header would have.
        expected: u64,
        /// Size reported by the filesystem.
        actual: u64,
    },
    /// The caller's frame buffer cannot hold one record.
    BufferTooSmall {
        /// Bytes one record needs.
        needed: usize,
        /// Bytes the buffer holds.
        capacity: usize,
    },
    /// End of file in the middle of a frame record.
    ShortRead {
        /// Zero-based index of the truncated frame.
        frame: u16,
        /// Bytes the record needed.
        needed: usize,
        /// Bytes actually read.
        got: usize,
    },
    /// The record did not start with `"FRM"`: the stream is desynchronised.
    Desync {
        /// Zero-based index of the offending frame.
        frame: u16,
        /// The three bytes found where the marker should be.
        found: [u8; 3],
    },
}

impl<E: core::fmt::Debug> core::fmt::Display for ReaderError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Open(e) => write!(f, "failed to open container: {e:?}"),
            Self::Io(e) => write!(f, "container read failed: {e:?}"),
            Self::HeaderShort { got } => {
                write!(f, "container header truncated ({got} of 6 bytes)")
            }
            Self::Length { expected, actual } => write!(
                f,
                "malformed container: {actual} bytes on disk, header implies {expected}"
            ),
            Self::BufferTooSmall { needed, capacity } => write!(
                f,
                "frame buffer too small: record is {needed} bytes, buffer holds {capacity}"
            ),
            Self::ShortRead { frame, needed, got } => write!(
                f,
                "frame {frame} truncated ({got} of {needed} bytes)"
            ),
            Self::Desync { frame, found } => write!(
                f,
                "frame {frame} desynchronised: marker bytes {found:02X?}"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// VideoReader
// ---------------------------------------------------------------------------

/// Sequential reader over an open container file.
///
/// Call [`VideoReader::open`] to parse and validate the header, then
/// [`read_frame`](VideoReader::read_frame) once per frame with a reusable
/// buffer of at least [`VideoHeader::record_len`] bytes.
pub struct VideoReader<F: File> {
    file: F,
    header: VideoHeader,
    next_frame: u16,
}

impl<F: File> VideoReader<F> {
    /// Open the container at `path` and read its header.
    ///
    /// Validates that the file size matches the header exactly; any
    /// deviation is a malformed container.
    ///
    /// # Errors
    ///
    /// [`ReaderError::Open`] if the file cannot be opened,
    /// [`ReaderError::Io`]/[`ReaderError::HeaderShort`] if the header cannot
    /// be read, [`ReaderError::Length`] on a size mismatch.
    pub async fn open<S>(storage: &mut S, path: &str) -> Result<Self, ReaderError<F::Error>>
    where
        S: Storage<File = F, Error = F::Error>,
    {
        let mut file = storage.open_file(path).await.map_err(ReaderError::Open)?;

        let mut buf = [0u8; VideoHeader::SIZE];
        let got = read_exact(&mut file, &mut buf)
            .await
            .map_err(ReaderError::Io)?;
        if got < VideoHeader::SIZE {
            return Err(ReaderError::HeaderShort { got });
        }
        let header = VideoHeader::decode(&buf);

        let expected = header.container_len();
        let actual = file.size();
        if actual != expected {
            return Err(ReaderError::Length { expected, actual });
        }

        Ok(Self {
            file,
            header,
            next_frame: 0,
        })
    }

    /// The decoded container header.
    #[must_use]
    pub fn header(&self) -> VideoHeader {
        self.header
    }

    /// Zero-based index of the next frame `read_frame` will deliver.
    #[must_use]
    pub fn next_frame(&self) -> u16 {
        self.next_frame
    }

    /// Read the next frame record into `buf`.
    ///
    /// On success `buf[..3]` holds the verified marker and
    /// `buf[3..record_len]` the pixel payload.
    ///
    /// # Errors
    ///
    /// [`ReaderError::BufferTooSmall`] if `buf` cannot hold one record,
    /// [`ReaderError::ShortRead`] on EOF mid-record,
    /// [`ReaderError::Desync`] when the marker check fails. All are fatal
    /// for the session; the reader makes no attempt to realign.
    pub async fn read_frame(&mut self, buf: &mut [u8]) -> Result<(), ReaderError<F::Error>> {
        let frame = self.next_frame;
        let needed = self.header.record_len();
        let capacity = buf.len();
        let dst = buf
            .get_mut(..needed)
            .ok_or(ReaderError::BufferTooSmall { needed, capacity })?;

        let got = read_exact(&mut self.file, dst)
            .await
            .map_err(ReaderError::Io)?;
        if got < needed {
            return Err(ReaderError::ShortRead { frame, needed, got });
        }

        if dst[..FRAME_MARKER.len()] != FRAME_MARKER {
            let mut found = [0u8; 3];
            found.copy_from_slice(&dst[..FRAME_MARKER.len()]);
            return Err(ReaderError::Desync { frame, found });
        }

        self.next_frame = self.next_frame.saturating_add(1);
        Ok(())
    }
}

/// Read until `buf` is full or EOF, retrying on short reads.
///
/// Returns the number of bytes read (`< buf.len()` only at EOF).
async fn read_exact<F: File>(file: &mut F, buf: &mut [u8]) -> Result<usize, F::Error> {
    let mut pos = 0;
    while pos < buf.len() {
        let n = file.read(&mut buf[pos..]).await?;
        if n == 0 {
            break;
        }
        pos = pos.saturating_add(n);
    }
    Ok(pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
