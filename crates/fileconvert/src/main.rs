//! fileconvert-rs, the file format converter CLI.
//!
//! Supports two modes:
//! - Legacy: `fileconvert-rs input.png output.pdf [--options]`
//! - Modern: `fileconvert-rs convert input.png -o output.pdf`
//!
//! `fileconvert-rs formats [ext]` prints the capability table.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use fileconvert::{available_targets_for_extension, convert_with_options, FnProgress};
use fileconvert_core::format::FileFormat;
use fileconvert_core::options::ConversionOptions;

#[derive(Parser)]
#[command(name = "fileconvert-rs", version, about = "File format converter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file (legacy mode)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output file (legacy mode)
    #[arg(global = false)]
    output: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JPEG quality for JPEG outputs (1-100, default 80)
    #[arg(long, global = true)]
    jpeg_quality: Option<u8>,

    /// PDF rasterization DPI (default: 300)
    #[arg(long, global = true)]
    render_dpi: Option<u16>,

    /// Dump effective merged config as TOML and exit
    #[arg(long, global = true)]
    dump_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file (modern interface)
    Convert {
        /// Input file
        input: PathBuf,

        /// Output file; its extension selects the target format
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List supported output formats, for one extension or all inputs
    Formats {
        /// Input extension (e.g. "png"); omit to list every input format
        ext: Option<String>,
    },
}

/// Load config from global and project-local TOML files.
/// Later files override earlier ones. Missing files are silently ignored.
fn load_config() -> ConversionOptions {
    let mut opts = ConversionOptions::default();

    // 1. Global config: ~/.config/fileconvert-rs/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("fileconvert-rs").join("config.toml");
        if let Ok(contents) = std::fs::read_to_string(&global_path) {
            match toml::from_str::<ConversionOptions>(&contents) {
                Ok(parsed) => opts = parsed,
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", global_path.display(), e);
                }
            }
        }
    }

    // 2. Project-local config: ./.fileconvert-rs.toml
    let local_path = PathBuf::from(".fileconvert-rs.toml");
    if let Ok(contents) = std::fs::read_to_string(&local_path) {
        match toml::from_str::<ConversionOptions>(&contents) {
            // Project-local fully overrides global; serde(default) fills
            // in anything the file omits.
            Ok(parsed) => opts = parsed,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", local_path.display(), e);
            }
        }
    }

    opts
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the flag was explicitly provided.
fn apply_cli_overrides(opts: &mut ConversionOptions, cli: &Cli) {
    let matches = Cli::command().get_matches_from(std::env::args_os());

    if matches.value_source("verbose") == Some(clap::parser::ValueSource::CommandLine) {
        opts.verbose = cli.verbose;
    }

    if let Some(quality) = cli.jpeg_quality {
        opts.jpeg_quality = quality.clamp(1, 100);
    }

    if let Some(dpi) = cli.render_dpi {
        opts.render_dpi = dpi;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.dump_config {
        let mut opts = load_config();
        apply_cli_overrides(&mut opts, &cli);
        match toml::to_string_pretty(&opts) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let result = match &cli.command {
        Some(Commands::Convert { input, output }) => {
            run_conversion(input.clone(), output.clone(), &cli)
        }
        Some(Commands::Formats { ext }) => {
            print_formats(ext.as_deref());
            Ok(())
        }
        None => match (&cli.input, &cli.output) {
            (Some(input), Some(output)) => run_conversion(input.clone(), output.clone(), &cli),
            _ => {
                eprintln!("Usage: fileconvert-rs <input> <output> [options]");
                eprintln!("   or: fileconvert-rs convert <input> -o <output> [options]");
                eprintln!("   or: fileconvert-rs formats [ext]");
                process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run_conversion(input: PathBuf, output: PathBuf, cli: &Cli) -> Result<()> {
    let mut options = load_config();
    apply_cli_overrides(&mut options, cli);

    let progress = FnProgress(|percent: u8| {
        if percent < 100 {
            log::info!("[{:3}%]", percent);
        } else {
            log::info!("Done!");
        }
    });

    convert_with_options(&input, &output, &progress, &options)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

fn print_formats(ext: Option<&str>) {
    match ext {
        Some(ext) => {
            let targets = available_targets_for_extension(ext);
            if targets.is_empty() {
                println!("{}: no supported conversions", ext);
            } else {
                println!("{}: {}", ext.to_lowercase(), targets.join(", "));
            }
        }
        None => {
            for &format in FileFormat::all() {
                let targets = available_targets_for_extension(format.extension());
                if !targets.is_empty() {
                    println!("{}: {}", format.extension(), targets.join(", "));
                }
            }
        }
    }
}
