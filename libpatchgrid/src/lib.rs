#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! PatchGrid - fixed-size image patches with coordinate-encoded filenames
//!
//! This library splits rasters into a row-major grid of equally sized patches,
//! padding the right and bottom edges, and writes every patch to a file named
//! `<prefix>_<id>_<top>_<left>.<ext>`. The merger inverts the operation by
//! parsing those names back into origins and compositing the patches onto a
//! canvas.

pub mod error;
pub mod format;
pub mod layout;
pub mod merger;
pub mod naming;
pub mod splitter;
pub mod tiles;

pub use error::{PatchError, Result};
pub use format::PatchFormat;
pub use layout::{CellOrigin, GridLayout};
pub use merger::{MergeMode, MergeReport, MergedCanvas, Merger, PatchDirReport};
pub use naming::{PatchName, PatchPattern};
pub use splitter::{SplitJob, SplitSummary, Splitter};
pub use tiles::{Patch, PatchGrid, PatchOrigin};

/// Default patch width in pixels
pub const DEFAULT_PATCH_WIDTH: u32 = 1920;

/// Default patch height in pixels
pub const DEFAULT_PATCH_HEIGHT: u32 = 1080;

/// Default patch filename prefix
pub const DEFAULT_PREFIX: &str = "patch";

/// Raster extensions recognised as source images and patch files (lowercase, no dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];
