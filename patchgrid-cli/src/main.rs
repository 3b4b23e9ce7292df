#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    clippy::needless_pass_by_value
)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};

use patchgrid::{MergeMode, Merger, PatchError};

/// PatchGrid CLI tools
#[derive(Parser)]
#[command(name = "patchgrid")]
#[command(about = "PatchGrid CLI tools - reconstruct and inspect directories of image patches")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct an image from patches named '<prefix>_<id>_<top>_<left>.<ext>'
    Merge {
        #[command(flatten)]
        source: PatchSource,
        /// Output image path
        #[arg(long, default_value = "reconstructed.png")]
        output: PathBuf,
        /// How to treat gaps, overlaps and irregular patches
        #[arg(long, default_value = "lenient")]
        mode: Mode,
    },
    /// Report the grid layout of a patch directory
    Inspect {
        #[command(flatten)]
        source: PatchSource,
        /// Output format (json, yaml, toml)
        #[arg(short, long, default_value = "json")]
        format: InspectFormat,
        /// Pretty print output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[derive(clap::Args)]
struct PatchSource {
    /// Folder containing patches
    #[arg(
        value_name = "PATCH_DIR",
        required_unless_present = "patch_dir_option",
        conflicts_with = "patch_dir_option"
    )]
    patch_dir: Option<PathBuf>,

    /// Folder containing patches (alternative to the positional argument)
    #[arg(long = "patch-dir", value_name = "PATH")]
    patch_dir_option: Option<PathBuf>,

    /// Patch width; inferred from the first patch if omitted
    #[arg(long, requires = "patch_height", value_parser = clap::value_parser!(u32).range(1..))]
    patch_width: Option<u32>,

    /// Patch height; inferred from the first patch if omitted
    #[arg(long, requires = "patch_width", value_parser = clap::value_parser!(u32).range(1..))]
    patch_height: Option<u32>,

    /// Filename prefix used when splitting
    #[arg(long, default_value = patchgrid::DEFAULT_PREFIX)]
    prefix: String,
}

impl PatchSource {
    fn dir(&self) -> Result<PathBuf> {
        self.patch_dir
            .clone()
            .or_else(|| self.patch_dir_option.clone())
            .ok_or_else(|| anyhow::anyhow!("A patch directory is required"))
    }

    fn merger(&self) -> Result<Merger> {
        let merger = Merger::new(&self.prefix)?;
        Ok(match (self.patch_width, self.patch_height) {
            (Some(width), Some(height)) => merger.with_patch_size(width, height)?,
            _ => merger,
        })
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum Mode {
    Lenient,
    Strict,
}

impl From<Mode> for MergeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Lenient => Self::Lenient,
            Mode::Strict => Self::Strict,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum InspectFormat {
    Json,
    Yaml,
    Toml,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.quiet {
        log::LevelFilter::Error
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    // Run command
    if let Err(e) = run(args) {
        error!("Command failed: {}", e);

        let exit_code = e
            .downcast_ref::<PatchError>()
            .map_or(1, PatchError::exit_code);

        process::exit(exit_code);
    }
}

fn run(args: Args) -> Result<()> {
    if args.quiet && args.verbose {
        warn!("Both --quiet and --verbose specified, using --quiet");
    }

    match args.command {
        Commands::Merge {
            source,
            output,
            mode,
        } => cmd_merge(source, output, mode),
        Commands::Inspect {
            source,
            format,
            pretty,
        } => cmd_inspect(source, format, pretty),
    }
}

fn cmd_merge(source: PatchSource, output: PathBuf, mode: Mode) -> Result<()> {
    let dir = source.dir()?;
    info!("Merging patches from {}", dir.display());

    let merger = source.merger()?.with_mode(mode.into());
    let report = merger.merge(&dir, &output)?;
    debug!("{}", serde_json::to_string(&report)?);

    if report.unparsed_count() > 0 {
        info!(
            "{} unparsed patch file(s) were not used",
            report.unparsed_count()
        );
    }

    Ok(())
}

fn cmd_inspect(source: PatchSource, format: InspectFormat, pretty: bool) -> Result<()> {
    let dir = source.dir()?;
    info!("Inspecting {}", dir.display());

    let report = source.merger()?.inspect(&dir)?;

    let output = match format {
        InspectFormat::Json => {
            if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            }
        }
        InspectFormat::Yaml => serde_yaml::to_string(&report)?,
        InspectFormat::Toml => toml::to_string_pretty(&report)?,
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_merge_accepts_positional_dir() {
        let args = Args::try_parse_from(["patchgrid", "merge", "patches"]).unwrap();
        let Commands::Merge { source, output, .. } = args.command else {
            panic!("expected merge");
        };
        assert_eq!(source.dir().unwrap(), PathBuf::from("patches"));
        assert_eq!(output, PathBuf::from("reconstructed.png"));
        assert_eq!(source.prefix, "patch");
    }

    #[test]
    fn test_merge_accepts_patch_dir_flag() {
        let args =
            Args::try_parse_from(["patchgrid", "merge", "--patch-dir", "tiles", "--mode", "strict"])
                .unwrap();
        let Commands::Merge { source, mode, .. } = args.command else {
            panic!("expected merge");
        };
        assert_eq!(source.dir().unwrap(), PathBuf::from("tiles"));
        assert_eq!(MergeMode::from(mode), MergeMode::Strict);
    }

    #[test]
    fn test_merge_requires_dir() {
        assert!(Args::try_parse_from(["patchgrid", "merge"]).is_err());
    }

    #[test]
    fn test_patch_size_requires_both() {
        assert!(
            Args::try_parse_from(["patchgrid", "merge", "p", "--patch-width", "100"]).is_err()
        );
        assert!(Args::try_parse_from([
            "patchgrid",
            "merge",
            "p",
            "--patch-width",
            "100",
            "--patch-height",
            "50"
        ])
        .is_ok());
    }

    #[test]
    fn test_rejects_zero_patch_size() {
        assert!(Args::try_parse_from([
            "patchgrid",
            "merge",
            "p",
            "--patch-width",
            "0",
            "--patch-height",
            "50"
        ])
        .is_err());
    }
}
