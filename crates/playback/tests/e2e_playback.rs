//! End-to-end tests: ContainerWriter → disk → VideoReader → play() → sink.
//!
//! No mocks. Uses tempfiles and a pixel-capturing sink, exercising the
//! complete pipeline as it runs on hardware (with LocalFileStorage standing
//! in for the SD card).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use platform::display::FrameSink;
use platform::storage_local::LocalFileStorage;
use playback::{play, PlaybackError};
use std::fs;
use tempfile::TempDir;
use video::reader::ReaderError;
use video::writer::ContainerWriter;

/// Captures every payload pushed through the sink.
#[derive(Default)]
struct PixelCapture {
    frames: Vec<Vec<u8>>,
    geometry: Option<(u16, u16, u16, u16)>,
}

impl FrameSink for PixelCapture {
    type Error = core::convert::Infallible;

    async fn blit(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
    ) -> Result<(), Self::Error> {
        self.geometry = Some((x, y, w, h));
        self.frames.push(pixels.to_vec());
        Ok(())
    }
}

/// A gradient test frame: pixel value follows its index.
fn gradient_frame(width: u16, height: u16, seed: u8) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..u32::from(width) * u32::from(height) {
        let v = (i as u8).wrapping_add(seed);
        out.push(v);
        out.push(v.wrapping_mul(3));
    }
    out
}

#[tokio::test]
async fn e2e_full_container_reaches_the_sink_intact() {
    let tmp = TempDir::new().unwrap();
    let (width, height) = (16, 8);
    let frames: Vec<Vec<u8>> = (0..4).map(|i| gradient_frame(width, height, i * 7)).collect();

    let mut writer = ContainerWriter::new(width, height);
    for f in &frames {
        writer.add_frame(f).unwrap();
    }
    writer.write_file(&tmp.path().join("video.bin")).unwrap();

    let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
    let mut sink = PixelCapture::default();
    let mut buf = vec![0u8; 3 + usize::from(width) * usize::from(height) * 2];

    let report = play(&mut storage, &mut sink, "video.bin", &mut buf, |_| {})
        .await
        .unwrap();

    assert_eq!(report.frames_played, 4);
    assert_eq!(sink.geometry, Some((0, 0, width, height)));
    assert_eq!(sink.frames, frames, "payloads must arrive byte-identical");
}

#[tokio::test]
async fn e2e_corrupt_middle_frame_stops_playback_at_the_boundary() {
    let tmp = TempDir::new().unwrap();
    let mut writer = ContainerWriter::new(2, 2);
    for i in 0..3u8 {
        writer.add_frame(&[i; 8]).unwrap();
    }
    let mut bytes = writer.finish();

    // Corrupt the marker of frame 1 (header 6 + one record 11 bytes in).
    bytes[6 + 11] = b'X';
    fs::write(tmp.path().join("video.bin"), &bytes).unwrap();

    let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
    let mut sink = PixelCapture::default();
    let mut buf = [0u8; 11];

    let err = play(&mut storage, &mut sink, "video.bin", &mut buf, |_| {}).await;
    match err {
        Err(PlaybackError::Container(ReaderError::Desync { frame, found })) => {
            assert_eq!(frame, 1);
            assert_eq!(found[0], b'X');
        }
        other => panic!("expected a desync on frame 1, got {other:?}"),
    }
    assert_eq!(sink.frames.len(), 1, "only the intact frame 0 may be drawn");
}

#[tokio::test]
async fn e2e_panel_sized_container() {
    // Full 128x160 panel frames, the production geometry.
    let tmp = TempDir::new().unwrap();
    let (width, height) = (128u16, 160u16);
    let payload = usize::from(width) * usize::from(height) * 2;

    let mut writer = ContainerWriter::new(width, height);
    writer.add_frame(&vec![0x1F; payload]).unwrap();
    writer.add_frame(&vec![0xE0; payload]).unwrap();
    writer.write_file(&tmp.path().join("video.bin")).unwrap();

    let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
    let mut sink = PixelCapture::default();
    let mut buf = vec![0u8; 3 + payload];

    let mut seen = 0u32;
    let report = play(&mut storage, &mut sink, "video.bin", &mut buf, |stats| {
        assert_eq!(u32::from(stats.index), seen);
        seen += 1;
    })
    .await
    .unwrap();

    assert_eq!(report.frames_played, 2);
    assert_eq!(seen, 2);
    assert!(sink.frames.iter().all(|f| f.len() == payload));
}
