//! xtask pack-video — build a `video.bin` container from raw frame dumps.
//!
//! Frames are flat files of big-endian RGB565 pixels, row-major, named by
//! 1-based frame number: `1.bin`, `2.bin`, ... A gap in the numbering ends
//! the sequence. Each file must be exactly `width * height * 2` bytes.

use std::path::Path;

use anyhow::{bail, Context, Result};
use video::writer::ContainerWriter;

pub fn run(frames_dir: &Path, out: &Path, width: u16, height: u16) -> Result<()> {
    println!("Packing frames from {}", frames_dir.display());

    let expected = usize::from(width) * usize::from(height) * 2;
    let mut writer = ContainerWriter::new(width, height);

    let mut index = 1u32;
    loop {
        let frame_path = frames_dir.join(format!("{index}.bin"));
        if !frame_path.exists() {
            break;
        }
        let bytes = std::fs::read(&frame_path)
            .with_context(|| format!("reading {}", frame_path.display()))?;
        if bytes.len() != expected {
            bail!(
                "{} is {} bytes, {}x{} frames need {}",
                frame_path.display(),
                bytes.len(),
                width,
                height,
                expected
            );
        }
        writer
            .add_frame(&bytes)
            .with_context(|| format!("adding {}", frame_path.display()))?;
        index += 1;
    }

    let frames = writer.frame_count();
    if frames == 0 {
        bail!("no frames found (expected {}/1.bin)", frames_dir.display());
    }

    writer.write_file(out).context("writing container")?;
    println!(
        "Wrote {}: {} frames, {}x{}",
        out.display(),
        frames,
        width,
        height
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use video::format::VideoHeader;

    #[test]
    fn packs_numbered_frames_in_order() {
        let tmp = TempDir::new().unwrap();
        let frames = tmp.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        std::fs::write(frames.join("1.bin"), [0x11u8; 8]).unwrap();
        std::fs::write(frames.join("2.bin"), [0x22u8; 8]).unwrap();
        // 4.bin is unreachable behind the gap at 3.
        std::fs::write(frames.join("4.bin"), [0x44u8; 8]).unwrap();
        let out = tmp.path().join("video.bin");

        run(&frames, &out, 2, 2).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        let header = VideoHeader::decode(&bytes[..6].try_into().unwrap());
        assert_eq!(header.frame_count, 2);
        assert_eq!(bytes.len() as u64, header.container_len());
        assert_eq!(&bytes[6..9], b"FRM");
        assert_eq!(bytes[9], 0x11);
    }

    #[test]
    fn rejects_wrong_sized_frames() {
        let tmp = TempDir::new().unwrap();
        let frames = tmp.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        std::fs::write(frames.join("1.bin"), [0u8; 7]).unwrap();
        let out = tmp.path().join("video.bin");

        assert!(run(&frames, &out, 2, 2).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn empty_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let frames = tmp.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        let out = tmp.path().join("video.bin");
        assert!(run(&frames, &out, 2, 2).is_err());
    }
}
