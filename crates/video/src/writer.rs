//! `ContainerWriter` — assemble a well-formed video container.
//!
//! Only compiled with the `std` feature (used by test fixtures and the
//! `pack-video` xtask). Frames are accumulated in memory and written out in
//! one piece; a container small enough for the panel is small enough for the
//! host's RAM.

#[cfg(not(any(feature = "std", test)))]
compile_error!("video::writer requires the `std` feature");

use std::fs;
use std::path::Path;

use crate::format::{VideoHeader, FRAME_MARKER};

/// Error type for `ContainerWriter` operations.
#[derive(Debug)]
pub enum WriterError {
    /// A frame payload had the wrong length for the container's geometry.
    FrameSize {
        /// `width * height * 2`.
        expected: usize,
        /// What the caller supplied.
        got: usize,
    },
    /// The `u16` frame counter would overflow.
    TooManyFrames,
    /// An I/O error writing the file.
    Io(std::io::Error),
}

impl core::fmt::Display for WriterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FrameSize { expected, got } => {
                write!(f, "frame payload is {got} bytes, geometry needs {expected}")
            }
            Self::TooManyFrames => write!(f, "container cannot hold more than 65535 frames"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for WriterError {}

impl From<std::io::Error> for WriterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Accumulates frames and emits header + records.
///
/// Every frame must match the geometry fixed at construction; the writer
/// cannot produce a malformed container.
pub struct ContainerWriter {
    width: u16,
    height: u16,
    frame_count: u16,
    records: Vec<u8>,
}

impl ContainerWriter {
    /// Start a container with the given frame geometry.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            frame_count: 0,
            records: Vec::new(),
        }
    }

    /// Append one frame of big-endian RGB565 pixels, row-major.
    ///
    /// # Errors
    ///
    /// [`WriterError::FrameSize`] if `pixels` is not exactly
    /// `width * height * 2` bytes; [`WriterError::TooManyFrames`] past 65535.
    pub fn add_frame(&mut self, pixels: &[u8]) -> Result<(), WriterError> {
        let expected = usize::from(self.width) * usize::from(self.height) * 2;
        if pixels.len() != expected {
            return Err(WriterError::FrameSize {
                expected,
                got: pixels.len(),
            });
        }
        self.frame_count = self
            .frame_count
            .checked_add(1)
            .ok_or(WriterError::TooManyFrames)?;
        self.records.extend_from_slice(&FRAME_MARKER);
        self.records.extend_from_slice(pixels);
        Ok(())
    }

    /// Number of frames added so far.
    #[must_use]
    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Consume the writer and return the complete container bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let header = VideoHeader {
            width: self.width,
            height: self.height,
            frame_count: self.frame_count,
        };
        let mut out = Vec::with_capacity(VideoHeader::SIZE + self.records.len());
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(&self.records);
        out
    }

    /// Consume the writer and write the container to `path`.
    ///
    /// # Errors
    ///
    /// [`WriterError::Io`] if the file cannot be written.
    pub fn write_file(self, path: &Path) -> Result<(), WriterError> {
        fs::write(path, self.finish())?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn emits_exactly_the_documented_layout() {
        let mut w = ContainerWriter::new(2, 1);
        w.add_frame(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        let bytes = w.finish();
        assert_eq!(
            bytes,
            vec![
                0x00, 0x02, // width
                0x00, 0x01, // height
                0x00, 0x01, // frame_count
                0x46, 0x52, 0x4D, // "FRM"
                0x11, 0x22, 0x33, 0x44, // payload
            ]
        );
    }

    #[test]
    fn total_size_matches_header_arithmetic() {
        let mut w = ContainerWriter::new(4, 3);
        for _ in 0..5 {
            w.add_frame(&[0u8; 4 * 3 * 2]).unwrap();
        }
        let bytes = w.finish();
        let header = VideoHeader::decode(&bytes[..6].try_into().unwrap());
        assert_eq!(bytes.len() as u64, header.container_len());
        assert_eq!(header.frame_count, 5);
    }

    #[test]
    fn rejects_wrong_payload_size() {
        let mut w = ContainerWriter::new(2, 2);
        let err = w.add_frame(&[0u8; 7]);
        assert!(matches!(
            err,
            Err(WriterError::FrameSize {
                expected: 8,
                got: 7
            })
        ));
        assert_eq!(w.frame_count(), 0);
    }

    #[test]
    fn writes_a_file_to_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("video.bin");
        let mut w = ContainerWriter::new(1, 1);
        w.add_frame(&[0xF8, 0x00]).unwrap();
        w.write_file(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 6 + 5);
    }
}
