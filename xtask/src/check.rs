use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run() -> Result<()> {
    println!();
    println!("{}", "Checking firmware builds...".cyan().bold());

    // Check 1: hardware target
    println!("{}", "  Checking hardware target (STM32F4)...".cyan());
    let hw_start = Instant::now();
    let hw_output = Command::new("cargo")
        .args([
            "check",
            "-p",
            "firmware",
            "--target",
            "thumbv7em-none-eabihf",
            "--features",
            "hardware",
        ])
        .output()
        .context("Failed to check hardware build")?;

    if !hw_output.status.success() {
        eprintln!("{}", "  Hardware check failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&hw_output.stderr));
        anyhow::bail!("Hardware check failed");
    }
    println!(
        "{}",
        format!(
            "  Hardware check passed in {:.2}s",
            hw_start.elapsed().as_secs_f64()
        )
        .green()
    );

    // Check 2: host targets (driver, container, playback, tooling)
    println!("{}", "  Checking host workspace...".cyan());
    let host_start = Instant::now();
    let host_output = Command::new("cargo")
        .args(["check", "--workspace"])
        .output()
        .context("Failed to check host build")?;

    if !host_output.status.success() {
        eprintln!("{}", "  Host check failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&host_output.stderr));
        anyhow::bail!("Host check failed");
    }
    println!(
        "{}",
        format!(
            "  Host check passed in {:.2}s",
            host_start.elapsed().as_secs_f64()
        )
        .green()
    );

    println!("{}", "All checks passed".green().bold());
    Ok(())
}
