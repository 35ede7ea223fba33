//! Pack command implementation
//!
//! Runs the atlas pipeline over a source directory and prints a summary.

use anyhow::{Context, Result};
use colored::Colorize;
use spritepack_spec::BackendError;
use std::process::ExitCode;
use std::time::Instant;

use super::json_output::{JsonError, PackOutput};
use crate::pipeline::{run_pipeline, PipelineConfig, PipelineError, PipelineReport};

/// Run the pack command
///
/// # Returns
/// Exit code: 0 on success, 1 for configuration errors, 2 for pipeline errors
pub fn run(config: &PipelineConfig, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(config)
    } else {
        run_human(config)
    }
}

fn run_human(config: &PipelineConfig) -> Result<ExitCode> {
    let start = Instant::now();

    println!(
        "{} {}",
        "Packing:".cyan().bold(),
        config.source_dir.display()
    );

    match run_pipeline(config) {
        Ok(report) => {
            print_report(&report);
            println!(
                "\n{} {} sprite(s) on {} sheet(s) ({}ms)",
                "SUCCESS".green().bold(),
                report.sprite_count,
                report.sheets.len(),
                start.elapsed().as_millis()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!(
                "\n{} [{}] {}",
                "FAILED".red().bold(),
                err.code(),
                err
            );
            Ok(ExitCode::from(err.exit_code()))
        }
    }
}

fn run_json(config: &PipelineConfig) -> Result<ExitCode> {
    let (output, code) = match run_pipeline(config) {
        Ok(report) => (PackOutput::success(report), ExitCode::SUCCESS),
        Err(err) => (failure_output(&err), ExitCode::from(err.exit_code())),
    };

    let json =
        serde_json::to_string_pretty(&output).context("Failed to serialize pack output")?;
    println!("{}", json);
    Ok(code)
}

fn failure_output(err: &PipelineError) -> PackOutput {
    PackOutput::failure(JsonError::from(err))
}

fn print_report(report: &PipelineReport) {
    for file in &report.ignored_files {
        println!("  {} ignored {}", "-".dimmed(), file.dimmed());
    }
    for skipped in &report.skipped_layers {
        println!(
            "  {} skipped layer '{}' of {}: {}",
            "!".yellow(),
            skipped.layer,
            skipped.svg.display(),
            skipped.reason
        );
    }
    for warning in &report.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
    if report.dropped_tiles > 0 {
        println!(
            "  {} {} tile(s) not referenced by any clip",
            "-".dimmed(),
            report.dropped_tiles
        );
    }

    println!(
        "{} {}x{}",
        "Sheet size:".dimmed(),
        report.sheet_side,
        report.sheet_side
    );
    for sheet in &report.sheets {
        println!(
            "  {} {} ({} sprites, {})",
            "->".green(),
            sheet.image.display(),
            sheet.sprites,
            &sheet.hash[..16.min(sheet.hash.len())]
        );
        println!("     {}", sheet.index_file.display().to_string().dimmed());
    }
    for set in &report.frame_sets {
        println!(
            "  {} {} ({} clip(s), {} frame(s))",
            "->".green(),
            set.name,
            set.clips,
            set.frames
        );
    }
    if !report.resources.is_empty() {
        println!(
            "{} {} Godot resource(s)",
            "Resources:".dimmed(),
            report.resources.len()
        );
    }
    if !report.images.is_empty() {
        println!(
            "{} {} sprite image(s)",
            "Images:".dimmed(),
            report.images.len()
        );
    }
}
