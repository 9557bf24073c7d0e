//! The playback session loop.
//!
//! One call to [`play`] is one session: open the container, read the header,
//! then alternate read-frame / blit-frame until the container is exhausted
//! or something fails. The caller supplies the frame buffer (one record:
//! marker + payload) so the loop itself allocates nothing.
//!
//! Cleanup is unconditional: the open file is dropped and
//! [`platform::Storage::release`] runs whether the session completed, hit a
//! corrupt frame, or died on the bus. Timing diagnostics are advisory only;
//! they are handed to an observer callback and never influence control flow.

use embassy_time::Instant;

use platform::display::FrameSink;
use platform::storage::{File, Storage};
use video::format::FRAME_MARKER;
use video::reader::{ReaderError, VideoReader};

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Read/draw timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Zero-based frame index.
    pub index: u16,
    /// Milliseconds spent reading the record from storage.
    pub read_ms: u64,
    /// Milliseconds spent pushing the payload to the panel.
    pub draw_ms: u64,
}

/// Aggregate diagnostics for one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackReport {
    /// Frame width from the container header.
    pub width: u16,
    /// Frame height from the container header.
    pub height: u16,
    /// Frames read and drawn.
    pub frames_played: u16,
    /// Wall-clock duration of the whole session in milliseconds.
    pub total_ms: u64,
    /// Sum of per-frame read times.
    pub total_read_ms: u64,
    /// Sum of per-frame draw times.
    pub total_draw_ms: u64,
    /// Slowest single frame read.
    pub max_read_ms: u64,
    /// Slowest single frame draw.
    pub max_draw_ms: u64,
}

impl PlaybackReport {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            frames_played: 0,
            total_ms: 0,
            total_read_ms: 0,
            total_draw_ms: 0,
            max_read_ms: 0,
            max_draw_ms: 0,
        }
    }

    fn record(&mut self, stats: &FrameStats) {
        self.frames_played = self.frames_played.saturating_add(1);
        self.total_read_ms = self.total_read_ms.saturating_add(stats.read_ms);
        self.total_draw_ms = self.total_draw_ms.saturating_add(stats.draw_ms);
        self.max_read_ms = self.max_read_ms.max(stats.read_ms);
        self.max_draw_ms = self.max_draw_ms.max(stats.draw_ms);
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A fatal playback failure. `SE` is the storage status code, `DE` the
/// display error. Nothing here is retried.
#[derive(Debug)]
pub enum PlaybackError<SE: core::fmt::Debug, DE: core::fmt::Debug> {
    /// Opening, validating, or reading the container failed.
    Container(ReaderError<SE>),
    /// Pushing a frame to the panel failed; the bus has no recovery path.
    Display(DE),
    /// The session succeeded but the volume could not be released.
    Release(SE),
}

impl<SE: core::fmt::Debug, DE: core::fmt::Debug> From<ReaderError<SE>> for PlaybackError<SE, DE> {
    fn from(e: ReaderError<SE>) -> Self {
        Self::Container(e)
    }
}

impl<SE: core::fmt::Debug, DE: core::fmt::Debug> core::fmt::Display for PlaybackError<SE, DE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Container(e) => write!(f, "playback aborted: {e}"),
            Self::Display(e) => write!(f, "display transport failed: {e:?}"),
            Self::Release(e) => write!(f, "volume release failed: {e:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Play the container at `path` to `sink`, frame by frame.
///
/// `frame_buf` is the session's single reusable record buffer; it must hold
/// at least `3 + width * height * 2` bytes for the container's geometry.
/// `observer` receives per-frame timing and must not block.
///
/// The storage volume is released on every exit path. A release failure
/// after a successful session is reported; after a failed session the
/// session's own error wins.
///
/// # Errors
///
/// The first fatal failure of the session, see [`PlaybackError`].
pub async fn play<S, D, O>(
    storage: &mut S,
    sink: &mut D,
    path: &str,
    frame_buf: &mut [u8],
    observer: O,
) -> Result<PlaybackReport, PlaybackError<S::Error, D::Error>>
where
    S: Storage,
    S::File: File<Error = S::Error>,
    D: FrameSink,
    O: FnMut(&FrameStats),
{
    let result = run_session(storage, sink, path, frame_buf, observer).await;
    let released = storage.release().await;
    match (result, released) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(e)) => Err(PlaybackError::Release(e)),
        // The failure that aborted the session outranks any release error.
        (Err(e), _) => Err(e),
    }
}

async fn run_session<S, D, O>(
    storage: &mut S,
    sink: &mut D,
    path: &str,
    frame_buf: &mut [u8],
    mut observer: O,
) -> Result<PlaybackReport, PlaybackError<S::Error, D::Error>>
where
    S: Storage,
    S::File: File<Error = S::Error>,
    D: FrameSink,
    O: FnMut(&FrameStats),
{
    let mut reader = VideoReader::open(storage, path).await?;
    let header = reader.header();
    let record_len = header.record_len();

    let mut report = PlaybackReport::new(header.width, header.height);
    let session_start = Instant::now();

    for index in 0..header.frame_count {
        let read_start = Instant::now();
        reader.read_frame(frame_buf).await?;
        let read_ms = read_start.elapsed().as_millis();

        // read_frame validated the buffer holds a full record.
        let payload = &frame_buf[FRAME_MARKER.len()..record_len];
        let draw_start = Instant::now();
        sink.blit(0, 0, header.width, header.height, payload)
            .await
            .map_err(PlaybackError::Display)?;
        let draw_ms = draw_start.elapsed().as_millis();

        let stats = FrameStats {
            index,
            read_ms,
            draw_ms,
        };
        report.record(&stats);
        observer(&stats);
    }

    report.total_ms = session_start.elapsed().as_millis();
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
