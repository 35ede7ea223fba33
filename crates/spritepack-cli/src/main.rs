//! SpritePack CLI - packs sprites, tile sheets and vector layers into atlases
//!
//! This binary provides the `pack` and `doctor` commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use spritepack_backend_inkscape::InkscapeConfig;
use spritepack_backend_texture::DEFAULT_MAX_SHEET_SIDE;
use spritepack_cli::commands;
use spritepack_cli::emit::DEFAULT_RESOURCE_DIR;
use spritepack_cli::pipeline::PipelineConfig;

/// SpritePack - Sprite Atlas Builder for Godot
#[derive(Parser)]
#[command(name = "spritepack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack every asset of a directory into one or more atlas sheets
    Pack {
        /// Directory scanned recursively for images, drawings and frame tables
        #[arg(short, long)]
        source_dir: PathBuf,

        /// Sheet path without extension (".png" and ".json" are appended)
        #[arg(short, long)]
        output: PathBuf,

        /// Also write every sprite as its own PNG under this directory
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// Write Godot AtlasTexture and SpriteFrames resources under this directory
        #[arg(long)]
        godot_dir: Option<PathBuf>,

        /// Godot directory the sheet images are imported under
        #[arg(long, default_value = DEFAULT_RESOURCE_DIR)]
        resource_dir: String,

        /// Path to the Inkscape executable
        #[arg(long)]
        inkscape_path: Option<PathBuf>,

        /// Largest allowed sheet side in pixels
        #[arg(long, default_value_t = DEFAULT_MAX_SHEET_SIDE, value_parser = clap::value_parser!(u32).range(3..))]
        max_size: u32,

        /// Abort when Inkscape fails on a layer instead of skipping it
        #[arg(long)]
        fail_on_export_error: bool,

        /// Output a machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check system dependencies and configuration
    Doctor {
        /// Path to the Inkscape executable
        #[arg(long)]
        inkscape_path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pack {
            source_dir,
            output,
            image_dir,
            godot_dir,
            resource_dir,
            inkscape_path,
            max_size,
            fail_on_export_error,
            json,
        } => {
            let mut inkscape = InkscapeConfig::default().fail_on_export_error(fail_on_export_error);
            if let Some(path) = inkscape_path {
                inkscape = inkscape.inkscape_path(path);
            }

            let mut config = PipelineConfig::new(source_dir, output)
                .resource_dir(resource_dir)
                .max_side(max_size)
                .inkscape(inkscape);
            if let Some(dir) = image_dir {
                config = config.image_dir(dir);
            }
            if let Some(dir) = godot_dir {
                config = config.godot_dir(dir);
            }

            commands::pack::run(&config, json)
        }
        Commands::Doctor { inkscape_path } => commands::doctor::run(inkscape_path.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(2)
        }
    }
}
