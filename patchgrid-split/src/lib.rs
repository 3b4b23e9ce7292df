#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! PatchGrid splitter library
//!
//! Thin front end over [`patchgrid::Splitter`] used by the `patch-split` tool.

use std::path::Path;

pub use patchgrid::{PatchError, PatchFormat, Result, SplitJob, SplitSummary, Splitter};

/// Re-export planning helpers from patchgrid
pub mod planning {
    pub use patchgrid::format::{find_images_recursive, is_image_path};
    pub use patchgrid::splitter::plan_split;
}

/// Convenience function to split an image into `output_dir`
pub fn split_image_to_dir(
    image: &image::DynamicImage,
    output_dir: &Path,
    patch_width: u32,
    patch_height: u32,
    prefix: &str,
    format: PatchFormat,
) -> Result<SplitSummary> {
    Splitter::new(patch_width, patch_height)?
        .with_prefix(prefix)
        .with_format(format)
        .split_image(&image.to_rgb8(), output_dir)
}
