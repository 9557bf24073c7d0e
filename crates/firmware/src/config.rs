//! Compile-time configuration.
//!
//! There is deliberately no runtime configuration surface: the panel variant
//! and the container path are fixed per board image.

use crate::display::PanelGeometry;

/// The panel this image drives.
pub const PANEL: PanelGeometry = PanelGeometry::GREENTAB_128X160;

/// Container path on the SD card, relative to the volume root.
pub const VIDEO_PATH: &str = "vid/video.bin";

/// Display SPI clock. The ST7735 write path is specified to 15 MHz.
pub const DISPLAY_SPI_HZ: u32 = 15_000_000;

/// SD card SPI clock.
pub const SD_SPI_HZ: u32 = 12_000_000;

/// One frame record: marker plus a full panel of RGB565 pixels.
pub const FRAME_BUF_LEN: usize = 3 + (PANEL.width as usize) * (PANEL.height as usize) * 2;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_holds_one_full_panel_record() {
        assert_eq!(FRAME_BUF_LEN, 3 + 128 * 160 * 2);
    }
}
