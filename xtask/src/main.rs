// Desktop tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod flash;
mod pack_video;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "st7735-flick development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flash firmware to the STM32F4 target via probe-rs
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
    },
    /// Check firmware builds for both the hardware and host targets
    Check,
    /// Run all tests
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Pack raw RGB565 frame dumps into a video.bin container
    PackVideo {
        /// Directory of per-frame dumps named 1.bin, 2.bin, ...
        #[arg(long)]
        frames_dir: std::path::PathBuf,
        /// Output container path
        #[arg(long, default_value = "video.bin")]
        out: std::path::PathBuf,
        /// Frame width in pixels
        #[arg(long)]
        width: u16,
        /// Frame height in pixels
        #[arg(long)]
        height: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash { release } => flash::run(release),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::PackVideo {
            frames_dir,
            out,
            width,
            height,
        } => pack_video::run(&frames_dir, &out, width, height),
    }
}
