use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "Running tests...".cyan().bold());

    let run_unit = !integration_only;
    let run_integration = !unit_only;

    if run_unit {
        println!("{}", "  Running unit tests...".cyan());
        let start = Instant::now();
        let output = Command::new("cargo")
            .args(["test", "--lib", "--workspace"])
            .output()
            .context("Failed to run unit tests")?;

        if !output.status.success() {
            eprintln!("{}", "  Unit tests failed".red().bold());
            eprintln!("{}", String::from_utf8_lossy(&output.stdout));
            anyhow::bail!("Unit tests failed");
        }
        println!(
            "{}",
            format!(
                "  Unit tests passed in {:.2}s",
                start.elapsed().as_secs_f64()
            )
            .green()
        );
    }

    if run_integration {
        println!("{}", "  Running integration tests...".cyan());
        let start = Instant::now();
        let output = Command::new("cargo")
            .args(["test", "--tests", "--workspace"])
            .output()
            .context("Failed to run integration tests")?;

        if !output.status.success() {
            eprintln!("{}", "  Integration tests failed".red().bold());
            eprintln!("{}", String::from_utf8_lossy(&output.stdout));
            anyhow::bail!("Integration tests failed");
        }
        println!(
            "{}",
            format!(
                "  Integration tests passed in {:.2}s",
                start.elapsed().as_secs_f64()
            )
            .green()
        );
    }

    println!("{}", "All tests passed".green().bold());
    Ok(())
}
