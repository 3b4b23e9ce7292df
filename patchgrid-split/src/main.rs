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
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};

use patchgrid_split::planning::plan_split;
use patchgrid_split::{PatchError, PatchFormat, Splitter};

/// PatchGrid splitter
#[derive(Parser)]
#[command(name = "patch-split")]
#[command(about = "Split a single image or all images under a folder into fixed-size patches")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to an image file or a folder of images
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Patch width in pixels
    #[arg(long, default_value_t = patchgrid::DEFAULT_PATCH_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    patch_width: u32,

    /// Patch height in pixels
    #[arg(long, default_value_t = patchgrid::DEFAULT_PATCH_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    patch_height: u32,

    /// Directory to store patches
    #[arg(long, default_value = "patches")]
    output_dir: PathBuf,

    /// Filename prefix for patches
    #[arg(long, default_value = patchgrid::DEFAULT_PREFIX)]
    prefix: String,

    /// Output image format
    #[arg(long, default_value = "png")]
    ext: OutputExt,

    /// If input is a folder, create a subfolder per image
    #[arg(long)]
    per_image_subfolders: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputExt {
    Png,
    Jpg,
    Jpeg,
}

impl From<OutputExt> for PatchFormat {
    fn from(ext: OutputExt) -> Self {
        match ext {
            OutputExt::Png => Self::Png,
            OutputExt::Jpg => Self::Jpg,
            OutputExt::Jpeg => Self::Jpeg,
        }
    }
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

    if let Err(e) = run(args) {
        error!("{}", e);

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

    let splitter = Splitter::new(args.patch_width, args.patch_height)?
        .with_prefix(args.prefix.clone())
        .with_format(args.ext.into());

    let jobs = plan_split(&args.input, &args.output_dir, args.per_image_subfolders)?;
    info!(
        "Splitting {} image(s) into {}x{} patches",
        jobs.len(),
        args.patch_width,
        args.patch_height
    );

    let progress = if args.quiet || jobs.len() < 2 {
        ProgressBar::hidden()
    } else {
        create_progress_bar(jobs.len() as u64)
    };

    let mut total_patches = 0;
    for job in &jobs {
        progress.set_message(job.source.display().to_string());
        let summary = splitter.split_file(&job.source, &job.output_dir)?;
        debug!("{}", serde_json::to_string(&summary)?);
        total_patches += summary.patches;
        progress.inc(1);
    }

    progress.finish_and_clear();

    if jobs.len() > 1 {
        info!(
            "Saved {} patches from {} images under '{}'",
            total_patches,
            jobs.len(),
            args.output_dir.display()
        );
    }

    Ok(())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}
