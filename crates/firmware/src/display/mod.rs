//! ST7735 display stack: transport, command scripts, draw primitives.
//!
//! Module map:
//!
//! - [`transport`] — chip-select and data/command sequencing over a
//!   [`platform::bus::DisplayBus`]
//! - [`commands`] — controller opcodes and mode arguments
//! - [`script`] — typed initialization command scripts
//! - [`color`] — packed RGB565
//! - [`font`] — row-bitmap glyph fonts for [`driver::St7735::write_string`]
//! - [`driver`] — the panel state machine and draw primitives

pub mod color;
pub mod commands;
pub mod driver;
pub mod font;
pub mod script;
pub mod transport;

/// Widest scanline `fill_rect_fast` will buffer. Wider fills fall back to
/// the per-pixel path; every supported panel variant fits.
pub const MAX_LINE_PIXELS: usize = 160;

/// Panel dimensions and the controller RAM origin offset, fixed at build
/// time per board.
///
/// Every addressable coordinate lies in `[offset, offset + extent)` of the
/// controller's RAM; draw primitives take panel-relative coordinates and the
/// driver applies the offset when it programs the address window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelGeometry {
    /// Visible width in pixels.
    pub width: u16,
    /// Visible height in pixels.
    pub height: u16,
    /// RAM column of the first visible pixel.
    pub x_offset: u16,
    /// RAM row of the first visible pixel.
    pub y_offset: u16,
}

impl PanelGeometry {
    /// 1.8" 128×160 green-tab module (ST7735R, no origin offset).
    pub const GREENTAB_128X160: Self = Self {
        width: 128,
        height: 160,
        x_offset: 0,
        y_offset: 0,
    };

    /// 1.44" 128×128 module; its RAM window starts at (2, 3).
    pub const REDTAB_128X128: Self = Self {
        width: 128,
        height: 128,
        x_offset: 2,
        y_offset: 3,
    };
}
