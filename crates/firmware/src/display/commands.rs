//! ST7735 controller opcodes and mode arguments.
//!
//! Only the commands this driver issues are listed; the controller's read
//! commands are useless on a write-only wiring.

/// ST7735 command opcodes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// No operation.
    Nop = 0x00,
    /// Software reset; needs a settle delay afterwards.
    SwReset = 0x01,
    /// Leave sleep mode; worst-case wake is the long default delay.
    SleepOut = 0x11,
    /// Normal display mode on.
    NormalOn = 0x13,
    /// Display inversion off.
    InvertOff = 0x20,
    /// Display inversion on.
    InvertOn = 0x21,
    /// Select one of the four fixed gamma curves — 1 argument.
    GammaSet = 0x26,
    /// Display on.
    DisplayOn = 0x29,
    /// Column address window — 4 arguments.
    ColumnAddrSet = 0x2A,
    /// Row address window — 4 arguments.
    RowAddrSet = 0x2B,
    /// Start a pixel burst into the selected window.
    MemoryWrite = 0x2C,
    /// Memory access direction / color order — 1 argument.
    MadCtl = 0x36,
    /// Interface pixel format — 1 argument.
    ColMod = 0x3A,
    /// Positive-polarity gamma correction — 16 arguments.
    GammaPositive = 0xE0,
    /// Negative-polarity gamma correction — 16 arguments.
    GammaNegative = 0xE1,
}

/// MADCTL argument bits.
pub mod madctl {
    /// Row address order.
    pub const MY: u8 = 0x80;
    /// Column address order.
    pub const MX: u8 = 0x40;
    /// Row/column exchange.
    pub const MV: u8 = 0x20;
    /// Vertical refresh order.
    pub const ML: u8 = 0x10;
    /// BGR color filter order.
    pub const BGR: u8 = 0x08;
    /// Horizontal refresh order.
    pub const MH: u8 = 0x04;
}

/// COLMOD argument: 16 bits per pixel (RGB565).
pub const COLMOD_16BPP: u8 = 0x05;

/// GAMSET curve selection (GS=0).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gamma {
    /// Curve 1.0
    G10 = 0x01,
    /// Curve 2.5
    G25 = 0x02,
    /// Curve 2.2
    G22 = 0x04,
    /// Curve 1.8
    G18 = 0x08,
}
