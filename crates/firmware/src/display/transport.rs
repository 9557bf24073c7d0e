//! Chip-select and data/command sequencing for the ST7735.
//!
//! The controller multiplexes commands and parameters over one data line,
//! discriminated by the DC pin: DC low while the opcode byte clocks out, DC
//! high for everything else. `select`/`unselect` bracket every command or
//! data sequence; `unselect` is idempotent so callers can release the bus on
//! every exit path without tracking state.
//!
//! A bus-level error here is terminal. The panel is wired point-to-point
//! with no way to probe or reset the far end mid-session, so the error
//! propagates up until the controller halts.

use embedded_hal::digital::OutputPin;
use platform::bus::DisplayBus;

/// Transport failure. Both variants are unrecoverable; there are no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The SPI bus reported an error mid-transfer.
    Bus,
    /// A control pin (CS/DC/RST) could not be driven.
    Pin,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "display bus error"),
            Self::Pin => write!(f, "display control pin error"),
        }
    }
}

/// The CS/DC layer between the driver and the raw bus.
pub struct Transport<B, DC, CS> {
    bus: B,
    dc: DC,
    cs: CS,
}

impl<B, DC, CS> Transport<B, DC, CS>
where
    B: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
{
    /// Build the transport. Pin levels are left untouched; bring-up code is
    /// responsible for parking CS high before the first transaction.
    pub fn new(bus: B, dc: DC, cs: CS) -> Self {
        Self { bus, dc, cs }
    }

    /// Drive chip-select low. Must precede any command or data sequence.
    pub fn select(&mut self) -> Result<(), TransportError> {
        self.cs.set_low().map_err(|_| TransportError::Pin)
    }

    /// Drive chip-select high, releasing the bus.
    ///
    /// Idempotent: re-driving an already-high line is a no-op at the pin,
    /// so this is safe to call on every exit path, error or not.
    pub fn unselect(&mut self) -> Result<(), TransportError> {
        self.cs.set_high().map_err(|_| TransportError::Pin)
    }

    /// Transmit one opcode byte with DC in command mode.
    pub async fn write_command(&mut self, opcode: u8) -> Result<(), TransportError> {
        self.dc.set_low().map_err(|_| TransportError::Pin)?;
        self.bus
            .transmit(&[opcode])
            .await
            .map_err(|_| TransportError::Bus)
    }

    /// Transmit a parameter/pixel buffer with DC in data mode.
    ///
    /// Returns only after the bytes are fully on the wire, whichever bus
    /// realization sits underneath. An empty buffer touches nothing.
    pub async fn write_data(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(|_| TransportError::Pin)?;
        self.bus
            .transmit(data)
            .await
            .map_err(|_| TransportError::Bus)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use platform::bus::SpiTxBus;

    /// The mock expectations one `transmit` produces on a raw SpiBus.
    fn bus_write(data: &[u8]) -> [SpiTransaction<u8>; 2] {
        [
            SpiTransaction::write_vec(data.to_vec()),
            SpiTransaction::flush(),
        ]
    }

    fn idle_pin() -> PinMock {
        PinMock::new(&[])
    }

    #[tokio::test]
    async fn write_command_drops_dc_then_sends_one_byte() {
        let mut spi = SpiMock::new(&bus_write(&[0x2A]));
        let mut dc = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut cs = idle_pin();

        let mut t = Transport::new(SpiTxBus::new(spi.clone()), dc.clone(), cs.clone());
        t.write_command(0x2A).await.unwrap();

        spi.done();
        dc.done();
        cs.done();
    }

    #[tokio::test]
    async fn write_data_raises_dc_then_sends_the_buffer() {
        let mut spi = SpiMock::new(&bus_write(&[0x00, 0x7F]));
        let mut dc = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let mut cs = idle_pin();

        let mut t = Transport::new(SpiTxBus::new(spi.clone()), dc.clone(), cs.clone());
        t.write_data(&[0x00, 0x7F]).await.unwrap();

        spi.done();
        dc.done();
        cs.done();
    }

    #[tokio::test]
    async fn empty_write_data_touches_nothing() {
        let mut spi = SpiMock::new(&[]);
        let mut dc = idle_pin();
        let mut cs = idle_pin();

        let mut t = Transport::new(SpiTxBus::new(spi.clone()), dc.clone(), cs.clone());
        t.write_data(&[]).await.unwrap();

        spi.done();
        dc.done();
        cs.done();
    }

    #[tokio::test]
    async fn select_and_unselect_bracket_the_bus() {
        let mut spi = SpiMock::new(&[]);
        let mut dc = idle_pin();
        let mut cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        let mut t = Transport::new(SpiTxBus::new(spi.clone()), dc.clone(), cs.clone());
        t.select().unwrap();
        t.unselect().unwrap();

        spi.done();
        dc.done();
        cs.done();
    }

    #[tokio::test]
    async fn unselect_twice_leaves_cs_high_both_times() {
        let mut spi = SpiMock::new(&[]);
        let mut dc = idle_pin();
        // Two consecutive highs, no intervening toggle, no error.
        let mut cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::High),
        ]);

        let mut t = Transport::new(SpiTxBus::new(spi.clone()), dc.clone(), cs.clone());
        t.unselect().unwrap();
        t.unselect().unwrap();

        spi.done();
        dc.done();
        cs.done();
    }

    #[tokio::test]
    async fn dc_pin_fault_maps_to_pin_error() {
        use embedded_hal_mock::eh1::MockError;
        use std::io::ErrorKind;

        let mut spi = SpiMock::new(&[]);
        let mut dc = PinMock::new(&[
            PinTransaction::set(PinState::Low).with_error(MockError::Io(ErrorKind::NotConnected))
        ]);
        let mut cs = idle_pin();

        let mut t = Transport::new(SpiTxBus::new(spi.clone()), dc.clone(), cs.clone());
        assert_eq!(t.write_command(0x01).await, Err(TransportError::Pin));

        spi.done();
        dc.done();
        cs.done();
    }
}
