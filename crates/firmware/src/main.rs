//! Hardware entry point: STM32F446RE Nucleo driving a 1.8" ST7735 over SPI1
//! and a microSD breakout over SPI2.
//!
//! Wiring:
//!
//! | Signal        | Pin  |
//! |---------------|------|
//! | Display SCK   | PA5  |
//! | Display MOSI  | PA7  |
//! | Display DC    | PA9  |
//! | Display CS    | PB6  |
//! | Display RST   | PC7  |
//! | SD SCK        | PB13 |
//! | SD MISO       | PB14 |
//! | SD MOSI       | PB15 |
//! | SD CS         | PB12 |

#![no_std]
#![no_main]

use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::Hertz;
use embassy_time::{Delay, Duration, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{SdCard, VolumeManager};
use static_cell::StaticCell;

use firmware::config;
use firmware::display::font::FONT_6X8;
use firmware::{Color, St7735};
use platform::bus::SpiTxBus;
use platform::storage_sd::{NullTimeSource, SdFatStorage};

use defmt_rtt as _;
use panic_probe as _;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    defmt::info!("st7735-flick v{=str}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(Default::default());

    // -----------------------------------------------------------------------
    // Display: SPI1 + DMA2, control pins parked inactive.
    // -----------------------------------------------------------------------
    let mut display_cfg = SpiConfig::default();
    display_cfg.frequency = Hertz(config::DISPLAY_SPI_HZ);

    let display_spi = Spi::new(
        p.SPI1, p.PA5, // SCK
        p.PA7, // MOSI
        p.PA6, // MISO (unused by the panel, required by the HAL)
        p.DMA2_CH3, // TX DMA
        p.DMA2_CH2, // RX DMA
        display_cfg,
    );

    let dc = Output::new(p.PA9, Level::Low, Speed::VeryHigh);
    let cs = Output::new(p.PB6, Level::High, Speed::VeryHigh);
    let rst = Output::new(p.PC7, Level::High, Speed::VeryHigh);

    let mut display = St7735::new(
        SpiTxBus::new(display_spi),
        dc,
        cs,
        rst,
        Delay,
        config::PANEL,
    );

    defmt::info!(
        "initializing panel {=u16}x{=u16}",
        config::PANEL.width,
        config::PANEL.height
    );
    if let Err(e) = display.init().await {
        defmt::error!("display init failed: {}", e);
        halt().await;
    }

    if let Err(e) = display.fill_screen_fast(Color::BLACK).await {
        defmt::error!("clear failed: {}", e);
        halt().await;
    }
    if let Err(e) = display
        .write_string(4, 4, "Ready", &FONT_6X8, Color::GREEN, Color::BLACK)
        .await
    {
        defmt::error!("banner failed: {}", e);
        halt().await;
    }
    Timer::after(Duration::from_millis(500)).await;

    // -----------------------------------------------------------------------
    // Storage: SD card in SPI mode on SPI2, blocking, FAT via embedded-sdmmc.
    // -----------------------------------------------------------------------
    let mut sd_cfg = SpiConfig::default();
    sd_cfg.frequency = Hertz(config::SD_SPI_HZ);

    let sd_spi = Spi::new_blocking(
        p.SPI2, p.PB13, // SCK
        p.PB15, // MOSI
        p.PB14, // MISO
        sd_cfg,
    );
    let sd_cs = Output::new(p.PB12, Level::High, Speed::VeryHigh);
    let Ok(sd_dev) = ExclusiveDevice::new(sd_spi, sd_cs, Delay) else {
        defmt::error!("SD chip-select init failed");
        halt().await;
    };
    let card = SdCard::new(sd_dev, Delay);

    static VOLUME_MGR: StaticCell<RefCell<SdVolumeManager>> = StaticCell::new();
    let mgr = VOLUME_MGR.init(RefCell::new(VolumeManager::new(card, NullTimeSource)));

    let mut storage = match SdFatStorage::mount(mgr) {
        Ok(storage) => storage,
        Err(e) => {
            defmt::error!("SD mount failed: {}", defmt::Debug2Format(&e));
            halt().await;
        }
    };
    defmt::info!("SD volume mounted");

    // -----------------------------------------------------------------------
    // Playback: one session, one reusable frame record buffer.
    // -----------------------------------------------------------------------
    static FRAME_BUF: StaticCell<[u8; config::FRAME_BUF_LEN]> = StaticCell::new();
    let frame_buf = FRAME_BUF.init([0u8; config::FRAME_BUF_LEN]);

    defmt::info!("playing {=str}", config::VIDEO_PATH);
    match playback::play(
        &mut storage,
        &mut display,
        config::VIDEO_PATH,
        frame_buf,
        |stats| {
            defmt::debug!(
                "frame {=u16}: read {=u64} ms, draw {=u64} ms",
                stats.index,
                stats.read_ms,
                stats.draw_ms
            );
        },
    )
    .await
    {
        Ok(report) => {
            defmt::info!("{=str}", firmware::diag::format_report(&report).as_str());
        }
        Err(e) => {
            defmt::error!("playback aborted: {}", defmt::Debug2Format(&e));
        }
    }

    halt().await
}

type SdSpiDevice = ExclusiveDevice<
    Spi<'static, embassy_stm32::peripherals::SPI2, embassy_stm32::dma::NoDma, embassy_stm32::dma::NoDma>,
    Output<'static, embassy_stm32::peripherals::PB12>,
    Delay,
>;
type SdVolumeManager = VolumeManager<SdCard<SdSpiDevice, Delay>, NullTimeSource>;

/// There is no recovery path below this layer: park the core.
async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
