//! Doctor command implementation
//!
//! Checks system dependencies and configuration.

use anyhow::Result;
use colored::Colorize;
use spritepack_backend_inkscape::{InkscapeCli, InkscapeError, INKSCAPE_PATH_ENV};
use std::env;
use std::path::Path;
use std::process::{Command, ExitCode};

/// Run the doctor command
///
/// Checks:
/// - Inkscape installation (needed only for vector drawings)
/// - Current directory permissions
/// - Version information
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(inkscape_path: Option<&Path>) -> Result<ExitCode> {
    println!("{}", "SpritePack Doctor".cyan().bold());
    println!("{}", "=================".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} spritepack v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    match get_rustc_version() {
        Some(version) => println!("  {} rustc {}", "->".green(), version),
        None => println!("  {} rustc (not found)", "->".yellow()),
    }

    println!();

    println!("{}", "Dependencies:".bold());
    match check_inkscape(inkscape_path) {
        InkscapeStatus::Found { path, version } => {
            println!(
                "  {} Inkscape {} ({})",
                "ok".green(),
                version,
                path.dimmed()
            );
        }
        InkscapeStatus::NotFound => {
            println!("  {} Inkscape not found", "!!".yellow());
            println!(
                "     {}",
                "Inkscape is required only when the source directory holds SVG drawings.".dimmed()
            );
            println!(
                "     {}",
                format!(
                    "Pass --inkscape-path or set {} to point at the executable.",
                    INKSCAPE_PATH_ENV
                )
                .dimmed()
            );
        }
        InkscapeStatus::Error(e) => {
            println!("  {} Inkscape check failed: {}", "!!".red(), e);
            all_ok = false;
        }
    }

    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".spritepack_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} Current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} Cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }

    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

enum InkscapeStatus {
    Found { path: String, version: String },
    NotFound,
    Error(String),
}

/// Extracts the version from output like "Inkscape 1.3.2 (091e20e, 2023-11-25)".
fn parse_inkscape_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Inkscape "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(|v| v.to_string())
}

fn check_inkscape(explicit: Option<&Path>) -> InkscapeStatus {
    let cli = match InkscapeCli::locate(explicit) {
        Ok(cli) => cli,
        Err(InkscapeError::InkscapeNotFound) => return InkscapeStatus::NotFound,
        Err(e) => return InkscapeStatus::Error(e.to_string()),
    };

    match cli.version() {
        Ok(output) => InkscapeStatus::Found {
            path: cli.executable().display().to_string(),
            version: parse_inkscape_version(&output).unwrap_or_else(|| "unknown".to_string()),
        },
        Err(e) => InkscapeStatus::Error(e.to_string()),
    }
}

fn parse_rustc_version(output: &str) -> Option<String> {
    // Parse "rustc 1.75.0 (..."
    output.split_whitespace().nth(1).map(|s| s.to_string())
}

fn get_rustc_version() -> Option<String> {
    let output = Command::new("rustc").arg("--version").output().ok()?;

    if output.status.success() {
        parse_rustc_version(&String::from_utf8_lossy(&output.stdout))
    } else {
        None
    }
}
