//! Playback orchestration: container in, panel out.
//!
//! This crate owns the frame loop and nothing else. It is written entirely
//! against the [`platform`] traits — any [`platform::Storage`] supplies the
//! container, any [`platform::FrameSink`] consumes the frames — which makes
//! the whole loop testable on the host with a temp directory and a recording
//! sink.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod player;

pub use player::{play, FrameStats, PlaybackError, PlaybackReport};
