//! Write-only display bus abstraction.
//!
//! The panel sits alone on a half-duplex SPI link, so the only primitive the
//! driver needs is "put these bytes on the wire and tell me when they are
//! out". [`DisplayBus::transmit`] is that primitive. Two realizations exist:
//!
//! - [`SpiTxBus`] drives an async [`embedded_hal_async::spi::SpiBus`]
//!   directly (write + flush).
//! - [`DmaTxBus`] hands the buffer to a DMA engine via [`BurstStart`] and
//!   then spins on a [`TransferFlag`] until the completion interrupt signals
//!   it, yielding to the executor between polls.
//!
//! Both are observably equivalent to the caller: `transmit` returns only
//! after the last byte has left the peripheral. There is no timeout on the
//! synchronous path; a hung bus is indistinguishable from a slow one.
//!
//! Completion flags are per-bus cells, not process-wide globals. The display
//! link and the SD card link each own one flag, and [`CompletionHooks`]
//! routes a completion interrupt to the right cell by peripheral identity so
//! activity on one bus can never be mistaken for the other.

use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};

/// Write-only bus used by the display transport.
///
/// Contract: `transmit` resolves only once every byte is physically on the
/// wire. Callers may reuse or drop the buffer immediately after the future
/// resolves. There is exactly one transfer in flight at a time; the trait
/// takes `&mut self` so the type system enforces it.
pub trait DisplayBus {
    /// Bus-level error. A transmit error has no recovery path at this layer.
    type Error: core::fmt::Debug;

    /// Transmit the buffer, returning once the transfer has fully completed.
    fn transmit(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;
}

// ---------------------------------------------------------------------------
// Synchronous realization
// ---------------------------------------------------------------------------

/// [`DisplayBus`] over a plain async SPI bus.
///
/// `write` may resolve while the peripheral FIFO is still draining, so the
/// trailing `flush` is what upholds the "bytes on the wire" contract.
pub struct SpiTxBus<S> {
    spi: S,
}

impl<S> SpiTxBus<S> {
    /// Wrap an SPI bus. Clock mode and bit order are bring-up concerns and
    /// must already be configured.
    pub fn new(spi: S) -> Self {
        Self { spi }
    }

    /// Give the SPI peripheral back.
    pub fn into_inner(self) -> S {
        self.spi
    }
}

impl<S: embedded_hal_async::spi::SpiBus<u8>> DisplayBus for SpiTxBus<S> {
    type Error = S::Error;

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(bytes).await?;
        self.spi.flush().await
    }
}

// ---------------------------------------------------------------------------
// Completion flag
// ---------------------------------------------------------------------------

/// One bus's transfer-completion cell.
///
/// Exactly one writer (the completion interrupt, via [`TransferFlag::signal`])
/// and one reader (the initiator, via [`TransferFlag::wait`]) exist at a
/// time, so plain release/acquire atomics suffice; no locking.
///
/// The cell starts *complete* (idle bus). The initiator arms it immediately
/// before starting a transfer and nobody else may clear it.
pub struct TransferFlag {
    done: AtomicBool,
}

impl TransferFlag {
    /// A new flag in the idle (complete) state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(true),
        }
    }

    /// Mark a transfer as in flight. Called by the initiator only.
    pub fn arm(&self) {
        self.done.store(false, Ordering::Release);
    }

    /// Mark the in-flight transfer as finished. Called from the bus's
    /// completion notification only.
    pub fn signal(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Non-blocking probe.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Spin until the completion notification fires, yielding to the
    /// executor on each poll. Waits forever: a hung bus is indistinguishable
    /// from a slow one, and neither has a recovery path.
    pub async fn wait(&self) {
        while !self.is_complete() {
            embassy_futures::yield_now().await;
        }
    }
}

impl Default for TransferFlag {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// DMA realization
// ---------------------------------------------------------------------------

/// Starts a DMA burst and returns immediately.
///
/// The completion side is out of band: the transfer's interrupt must call
/// [`TransferFlag::signal`] on the flag paired with this starter (usually via
/// [`CompletionHooks::on_complete`]).
pub trait BurstStart {
    /// Error starting the burst (bad channel state, peripheral fault).
    type Error: core::fmt::Debug;

    /// Begin transmitting `bytes`. Must not block for the transfer duration.
    fn start(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// [`DisplayBus`] over a DMA engine plus its completion flag.
///
/// `transmit` arms the flag, starts the burst and then blocks (cooperatively)
/// until the completion interrupt signals. Once a burst has started there is
/// no cancellation: it runs to completion or the controller halts.
pub struct DmaTxBus<T> {
    starter: T,
    done: &'static TransferFlag,
}

impl<T: BurstStart> DmaTxBus<T> {
    /// Pair a DMA starter with the flag its completion interrupt signals.
    pub fn new(starter: T, done: &'static TransferFlag) -> Self {
        Self { starter, done }
    }

    /// Give the starter back.
    pub fn into_inner(self) -> T {
        self.starter
    }
}

impl<T: BurstStart> DisplayBus for DmaTxBus<T> {
    type Error = T::Error;

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.done.arm();
        self.starter.start(bytes)?;
        self.done.wait().await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Completion dispatch
// ---------------------------------------------------------------------------

/// The two independent SPI links in this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusId {
    /// The TFT panel link.
    Display,
    /// The SD card link.
    Storage,
}

/// Routes a transfer-complete notification to the owning bus's flag.
///
/// This is the single point an interrupt handler calls; it keys on
/// peripheral identity so the display flag is only ever set by display
/// completions and the storage flag by storage completions.
pub struct CompletionHooks {
    display: &'static TransferFlag,
    storage: &'static TransferFlag,
}

impl CompletionHooks {
    /// Bind the two per-bus flags.
    #[must_use]
    pub const fn new(display: &'static TransferFlag, storage: &'static TransferFlag) -> Self {
        Self { display, storage }
    }

    /// Called from the transfer-complete interrupt with the identity of the
    /// peripheral that finished.
    pub fn on_complete(&self, id: BusId) {
        match id {
            BusId::Display => self.display.signal(),
            BusId::Storage => self.storage.signal(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[tokio::test]
    async fn spi_tx_bus_writes_then_flushes() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x2A, 0x00, 0x05]),
            SpiTransaction::flush(),
        ]);
        let mut bus = SpiTxBus::new(spi.clone());
        bus.transmit(&[0x2A, 0x00, 0x05]).await.unwrap();
        spi.done();
    }

    #[test]
    fn transfer_flag_starts_idle() {
        let flag = TransferFlag::new();
        assert!(flag.is_complete());
    }

    #[test]
    fn transfer_flag_arm_then_signal() {
        let flag = TransferFlag::new();
        flag.arm();
        assert!(!flag.is_complete());
        flag.signal();
        assert!(flag.is_complete());
    }

    /// A starter whose "interrupt" fires inside `start`, the degenerate case
    /// of a transfer that completes before the first poll of `wait`.
    struct ImmediateStarter {
        flag: &'static TransferFlag,
        sent: Vec<Vec<u8>>,
    }

    impl BurstStart for ImmediateStarter {
        type Error = core::convert::Infallible;

        fn start(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            self.sent.push(bytes.to_vec());
            self.flag.signal();
            Ok(())
        }
    }

    #[tokio::test]
    async fn dma_bus_transmits_and_returns_after_completion() {
        static FLAG: TransferFlag = TransferFlag::new();
        let starter = ImmediateStarter {
            flag: &FLAG,
            sent: Vec::new(),
        };
        let mut bus = DmaTxBus::new(starter, &FLAG);
        bus.transmit(&[0xDE, 0xAD]).await.unwrap();
        bus.transmit(&[0xBE]).await.unwrap();

        let starter = bus.into_inner();
        assert_eq!(starter.sent, vec![vec![0xDE, 0xAD], vec![0xBE]]);
        assert!(FLAG.is_complete());
    }

    /// A starter that never signals; completion must come from elsewhere.
    struct DetachedStarter;

    impl BurstStart for DetachedStarter {
        type Error = core::convert::Infallible;

        fn start(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn dma_bus_blocks_until_late_completion() {
        static FLAG: TransferFlag = TransferFlag::new();

        // Simulated completion interrupt: runs only when the waiter yields.
        let isr = tokio::spawn(async {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            FLAG.signal();
        });

        let mut bus = DmaTxBus::new(DetachedStarter, &FLAG);
        bus.transmit(&[0x55]).await.unwrap();
        assert!(FLAG.is_complete());
        isr.await.unwrap();
    }

    #[derive(Debug)]
    struct StartFault;

    struct FaultyStarter;

    impl BurstStart for FaultyStarter {
        type Error = StartFault;

        fn start(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> {
            Err(StartFault)
        }
    }

    #[tokio::test]
    async fn dma_bus_start_error_propagates_without_waiting() {
        static FLAG: TransferFlag = TransferFlag::new();
        let mut bus = DmaTxBus::new(FaultyStarter, &FLAG);
        // Must return the error immediately rather than spin on a flag
        // nobody will ever signal.
        assert!(bus.transmit(&[0x00]).await.is_err());
    }

    #[test]
    fn completion_dispatch_keys_on_peripheral_identity() {
        static DISPLAY: TransferFlag = TransferFlag::new();
        static STORAGE: TransferFlag = TransferFlag::new();
        let hooks = CompletionHooks::new(&DISPLAY, &STORAGE);

        DISPLAY.arm();
        STORAGE.arm();

        hooks.on_complete(BusId::Display);
        assert!(DISPLAY.is_complete());
        assert!(
            !STORAGE.is_complete(),
            "a display completion must not release a storage waiter"
        );

        hooks.on_complete(BusId::Storage);
        assert!(STORAGE.is_complete());
    }
}
