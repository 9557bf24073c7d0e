use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run(release: bool) -> Result<()> {
    let mode = if release { "release" } else { "debug" };

    println!();
    println!(
        "{}",
        format!("Building firmware ({} mode)...", mode).cyan().bold()
    );

    let build_start = Instant::now();
    let mut build_cmd = Command::new("cargo");
    build_cmd
        .arg("build")
        .arg("-p")
        .arg("firmware")
        .arg("--target")
        .arg("thumbv7em-none-eabihf")
        .arg("--features")
        .arg("hardware");

    if release {
        build_cmd.arg("--release");
    }

    let build_output = build_cmd.output().context("Failed to run cargo build")?;
    if !build_output.status.success() {
        eprintln!("{}", "Build failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&build_output.stderr));
        anyhow::bail!("Build failed");
    }
    println!(
        "{}",
        format!(
            "Build successful in {:.2}s",
            build_start.elapsed().as_secs_f64()
        )
        .green()
    );

    let binary = format!("target/thumbv7em-none-eabihf/{}/firmware", mode);
    println!("{}", format!("Flashing {} via probe-rs...", binary).cyan());

    let flash_output = Command::new("probe-rs")
        .args(["run", "--chip", "STM32F446RETx", &binary])
        .output()
        .context("Failed to run probe-rs (is it installed?)")?;

    if !flash_output.status.success() {
        eprintln!("{}", "Flash failed".red().bold());
        eprintln!("{}", String::from_utf8_lossy(&flash_output.stderr));
        anyhow::bail!("Flash failed");
    }

    println!("{}", "Flash complete".green().bold());
    Ok(())
}
