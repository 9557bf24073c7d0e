//! Hardware abstraction layer for the ST7735 video-player firmware.
//!
//! This crate provides trait-based abstractions for the two buses the player
//! touches, enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Feature Layers (video, playback)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + embedded-sdmmc)
//! ```
//!
//! # Abstractions
//!
//! - [`bus`] - write-only display bus with synchronous and DMA realizations,
//!   plus the per-bus completion flags and their dispatch point
//! - [`display`] - [`FrameSink`] consumed by the playback orchestrator
//! - [`storage`] - [`Storage`] / [`File`] for an opened FAT volume
//! - [`storage_sd`] - `embedded-sdmmc` implementation for the SD card target
//! - [`storage_local`] - `std::fs` implementation for host tests and tooling
//!
//! # Features
//!
//! - `std`: std-backed storage (host tests and the xtask)
//! - `defmt`: enable defmt::Format derives (hardware builds only)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod bus;
pub mod display;
pub mod storage;
pub mod storage_sd;

#[cfg(any(feature = "std", test))]
pub mod storage_local;

// Re-export the high-level traits
pub use bus::{BusId, CompletionHooks, DisplayBus, TransferFlag};
pub use display::FrameSink;
pub use storage::{File, Storage};
