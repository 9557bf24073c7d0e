//! ST7735 panel driver.
//!
//! The controller is a state machine the driver walks through exactly once:
//! Uninitialized → Resetting (hardware reset pulse) → ScriptExecuting (the
//! [`script::BOOT`] and [`script::DISPLAY_ON`] tables) → Ready. After that,
//! every draw primitive is the same dance: select the chip, program the
//! address window, burst pixel bytes, release the chip. The controller
//! auto-increments through the window in row-major order, which is what
//! makes whole-frame blits a single burst.
//!
//! Out-of-panel coordinates are clipped or ignored, never errors; a caller
//! asking for something partially off-panel is expected, a failing bus is
//! not. Transport failures propagate out of every primitive and are
//! unrecoverable.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use platform::bus::DisplayBus;
use platform::display::FrameSink;

use super::color::Color;
use super::commands::{Command, Gamma};
use super::font::Font;
use super::script::Step;
use super::transport::{Transport, TransportError};
use super::{script, PanelGeometry, MAX_LINE_PIXELS};

/// Reset line low time. The datasheet asks for 10 µs; 5 ms also covers the
/// panel's internal power settling before the first command.
const RESET_PULSE_MS: u32 = 5;

/// The ST7735 driver.
///
/// Generic over:
/// - `B` — a [`platform::bus::DisplayBus`] (synchronous or DMA realization).
/// - `DC` — data/command select [`OutputPin`].
/// - `CS` — chip select [`OutputPin`], active low.
/// - `RST` — hardware reset [`OutputPin`], active low.
/// - `DELAY` — [`DelayNs`] for reset settling and script delays.
///
/// On the STM32 target supply `embassy_time::Delay`; host tests use logging
/// fakes.
pub struct St7735<B, DC, CS, RST, DELAY> {
    transport: Transport<B, DC, CS>,
    rst: RST,
    delay: DELAY,
    geometry: PanelGeometry,
}

impl<B, DC, CS, RST, DELAY> St7735<B, DC, CS, RST, DELAY>
where
    B: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Create a driver for the given panel variant. No bus traffic happens
    /// until [`init`](Self::init).
    pub fn new(bus: B, dc: DC, cs: CS, rst: RST, delay: DELAY, geometry: PanelGeometry) -> Self {
        Self {
            transport: Transport::new(bus, dc, cs),
            rst,
            delay,
            geometry,
        }
    }

    /// The panel variant this driver was built for.
    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Reset the controller and replay the initialization scripts.
    ///
    /// Power-on sequence per the controller's power flow chart: chip select,
    /// hardware reset pulse, boot-up script (reset, sleep-out, scan
    /// direction, 16bpp), gamma/display-on script, release.
    pub async fn init(&mut self) -> Result<(), TransportError> {
        self.transport.select()?;
        let res = self.init_inner().await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn init_inner(&mut self) -> Result<(), TransportError> {
        self.hardware_reset().await?;
        self.run_script(script::BOOT).await?;
        self.run_script(script::DISPLAY_ON).await
    }

    async fn hardware_reset(&mut self) -> Result<(), TransportError> {
        self.rst.set_low().map_err(|_| TransportError::Pin)?;
        self.delay.delay_ms(RESET_PULSE_MS).await;
        self.rst.set_high().map_err(|_| TransportError::Pin)
    }

    /// Execute one command script: opcode, argument bytes, optional sleep,
    /// per step. Atomic per phase; a transport error aborts the script.
    async fn run_script(&mut self, steps: &[Step<'_>]) -> Result<(), TransportError> {
        for step in steps {
            self.transport.write_command(step.opcode).await?;
            self.transport.write_data(step.args).await?;
            if let Some(ms) = step.delay_ms {
                self.delay.delay_ms(u32::from(ms)).await;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Address window
    // -----------------------------------------------------------------------

    /// Select the RAM rectangle the next pixel burst fills.
    ///
    /// Coordinates are panel-relative; the panel's RAM origin offset is
    /// applied here, then each coordinate is split high byte first. Ends
    /// with the write-to-RAM command so the bus is ready for pixel data.
    async fn set_address_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), TransportError> {
        let (cx0, cx1) = (x0 + self.geometry.x_offset, x1 + self.geometry.x_offset);
        let (ry0, ry1) = (y0 + self.geometry.y_offset, y1 + self.geometry.y_offset);

        self.transport
            .write_command(Command::ColumnAddrSet as u8)
            .await?;
        let caset = [(cx0 >> 8) as u8, cx0 as u8, (cx1 >> 8) as u8, cx1 as u8];
        self.transport.write_data(&caset).await?;

        self.transport
            .write_command(Command::RowAddrSet as u8)
            .await?;
        let raset = [(ry0 >> 8) as u8, ry0 as u8, (ry1 >> 8) as u8, ry1 as u8];
        self.transport.write_data(&raset).await?;

        self.transport.write_command(Command::MemoryWrite as u8).await
    }

    /// Clip a rectangle against the panel. `None` means nothing to draw.
    fn clipped(geometry: PanelGeometry, x: u16, y: u16, w: u16, h: u16) -> Option<(u16, u16)> {
        if w == 0 || h == 0 || x >= geometry.width || y >= geometry.height {
            return None;
        }
        Some((w.min(geometry.width - x), h.min(geometry.height - y)))
    }

    // -----------------------------------------------------------------------
    // Draw primitives
    // -----------------------------------------------------------------------

    /// Write one pixel. Off-panel coordinates are ignored.
    pub async fn draw_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), TransportError> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return Ok(());
        }
        self.transport.select()?;
        let res = self.draw_pixel_inner(x, y, color).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn draw_pixel_inner(&mut self, x: u16, y: u16, color: Color) -> Result<(), TransportError> {
        self.set_address_window(x, y, x, y).await?;
        self.transport.write_data(&color.to_be_bytes()).await
    }

    /// Fill a rectangle one pixel write at a time.
    ///
    /// The rectangle is clipped so it never exceeds panel bounds; a
    /// rectangle fully outside is a no-op.
    pub async fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        color: Color,
    ) -> Result<(), TransportError> {
        let Some((w, h)) = Self::clipped(self.geometry, x, y, w, h) else {
            return Ok(());
        };
        self.transport.select()?;
        let res = self.fill_rect_inner(x, y, w, h, color).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn fill_rect_inner(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        color: Color,
    ) -> Result<(), TransportError> {
        self.set_address_window(x, y, x + w - 1, y + h - 1).await?;
        let px = color.to_be_bytes();
        for _ in 0..u32::from(w) * u32::from(h) {
            self.transport.write_data(&px).await?;
        }
        Ok(())
    }

    /// Fill a rectangle one scanline burst at a time.
    ///
    /// Builds a `w`-pixel line once and issues it `h` times, trading
    /// `2 * w` bytes of stack for far fewer bus transactions. Wire output is
    /// byte-identical to [`fill_rect`](Self::fill_rect); only the transfer
    /// granularity differs. Lines wider than [`MAX_LINE_PIXELS`] fall back
    /// to the per-pixel path.
    pub async fn fill_rect_fast(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        color: Color,
    ) -> Result<(), TransportError> {
        let Some((w, h)) = Self::clipped(self.geometry, x, y, w, h) else {
            return Ok(());
        };
        self.transport.select()?;
        let res = self.fill_rect_fast_inner(x, y, w, h, color).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn fill_rect_fast_inner(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        color: Color,
    ) -> Result<(), TransportError> {
        let line_len = usize::from(w) * 2;
        if line_len > MAX_LINE_PIXELS * 2 {
            return self.fill_rect_inner(x, y, w, h, color).await;
        }

        self.set_address_window(x, y, x + w - 1, y + h - 1).await?;

        let px = color.to_be_bytes();
        let mut line = [0u8; MAX_LINE_PIXELS * 2];
        for chunk in line[..line_len].chunks_exact_mut(2) {
            chunk.copy_from_slice(&px);
        }
        for _ in 0..h {
            self.transport.write_data(&line[..line_len]).await?;
        }
        Ok(())
    }

    /// Fill the whole panel, per-pixel writes.
    pub async fn fill_screen(&mut self, color: Color) -> Result<(), TransportError> {
        let g = self.geometry;
        self.fill_rect(0, 0, g.width, g.height, color).await
    }

    /// Fill the whole panel, scanline bursts.
    pub async fn fill_screen_fast(&mut self, color: Color) -> Result<(), TransportError> {
        let g = self.geometry;
        self.fill_rect_fast(0, 0, g.width, g.height, color).await
    }

    /// Blit a pre-packed image in one burst.
    ///
    /// `pixels` must already be in the controller's native layout:
    /// big-endian RGB565, row-major. The rectangle is clipped to panel
    /// bounds and at most `2 * w * h` bytes are transmitted.
    pub async fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
    ) -> Result<(), TransportError> {
        let Some((w, h)) = Self::clipped(self.geometry, x, y, w, h) else {
            return Ok(());
        };
        self.transport.select()?;
        let res = self.draw_image_inner(x, y, w, h, pixels).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn draw_image_inner(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
    ) -> Result<(), TransportError> {
        self.set_address_window(x, y, x + w - 1, y + h - 1).await?;
        let burst = usize::from(w) * usize::from(h) * 2;
        let len = burst.min(pixels.len());
        self.transport.write_data(&pixels[..len]).await
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// Draw a string, wrapping at the panel edge.
    ///
    /// Per glyph: a window the size of one font cell, then foreground or
    /// background pixels following the glyph bitmap MSB-first across each
    /// row word. When the next glyph would cross the right edge the cursor
    /// wraps to a new line, skipping a leading space; when the next line
    /// would cross the bottom edge drawing stops silently.
    pub async fn write_string(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        font: &Font,
        fg: Color,
        bg: Color,
    ) -> Result<(), TransportError> {
        self.transport.select()?;
        let res = self.write_string_inner(x, y, text, font, fg, bg).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn write_string_inner(
        &mut self,
        mut x: u16,
        mut y: u16,
        text: &str,
        font: &Font,
        fg: Color,
        bg: Color,
    ) -> Result<(), TransportError> {
        let mut chars = text.chars();
        let mut current = chars.next();

        while let Some(ch) = current {
            if x.saturating_add(font.width) >= self.geometry.width {
                x = 0;
                y = y.saturating_add(font.height);
                if y.saturating_add(font.height) >= self.geometry.height {
                    break;
                }
                if ch == ' ' {
                    // A wrapped line does not start with the space that
                    // separated the words.
                    current = chars.next();
                    continue;
                }
            }

            self.write_char_inner(x, y, ch, font, fg, bg).await?;
            x += font.width;
            current = chars.next();
        }
        Ok(())
    }

    async fn write_char_inner(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        font: &Font,
        fg: Color,
        bg: Color,
    ) -> Result<(), TransportError> {
        self.set_address_window(x, y, x + font.width - 1, y + font.height - 1)
            .await?;
        for &row in font.glyph(ch) {
            for col in 0..font.width {
                let lit = row
                    .checked_shl(u32::from(col))
                    .is_some_and(|shifted| shifted & 0x8000 != 0);
                let px = if lit { fg } else { bg };
                self.transport.write_data(&px.to_be_bytes()).await?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mode toggles
    // -----------------------------------------------------------------------

    /// Toggle display color inversion.
    pub async fn invert_colors(&mut self, invert: bool) -> Result<(), TransportError> {
        self.transport.select()?;
        let cmd = if invert {
            Command::InvertOn
        } else {
            Command::InvertOff
        };
        let res = self.transport.write_command(cmd as u8).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    /// Select one of the controller's fixed gamma curves.
    pub async fn set_gamma(&mut self, gamma: Gamma) -> Result<(), TransportError> {
        self.transport.select()?;
        let res = self.set_gamma_inner(gamma).await;
        let released = self.transport.unselect();
        res.and(released)
    }

    async fn set_gamma_inner(&mut self, gamma: Gamma) -> Result<(), TransportError> {
        self.transport.write_command(Command::GammaSet as u8).await?;
        self.transport.write_data(&[gamma as u8]).await
    }
}

// ---------------------------------------------------------------------------
// FrameSink — the playback loop blits through this
// ---------------------------------------------------------------------------

impl<B, DC, CS, RST, DELAY> FrameSink for St7735<B, DC, CS, RST, DELAY>
where
    B: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Error = TransportError;

    async fn blit(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
    ) -> Result<(), Self::Error> {
        self.draw_image(x, y, w, h, pixels).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
