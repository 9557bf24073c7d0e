//! Display abstraction consumed by the playback layer.

use core::future::Future;

/// A destination that can accept one rectangle of packed RGB565 pixels.
///
/// The playback orchestrator is written against this trait so it can be
/// tested on the host with a recording sink; on hardware the ST7735 driver
/// implements it by windowing the panel and bursting the payload.
///
/// Implementations must not retain the pixel slice past the call
/// (transmit-and-forget), and must treat out-of-panel rectangles by clipping
/// or ignoring, never by failing.
pub trait FrameSink {
    /// Error pushing pixels to the panel. Unrecoverable at this layer.
    type Error: core::fmt::Debug;

    /// Blit `w`×`h` pixels (big-endian RGB565, row-major, 2 bytes each) with
    /// the top-left corner at (`x`, `y`).
    fn blit(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>>;
}
