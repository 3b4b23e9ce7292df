use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info};
use serde::Serialize;

use crate::error::{PatchError, Result};
use crate::format::{find_images_recursive, PatchFormat};
use crate::tiles::PatchGrid;

/// One source image and the directory its patches go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitJob {
    pub source: PathBuf,
    pub output_dir: PathBuf,
}

/// Outcome of splitting a single image
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    /// Source image path, absent for in-memory images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub image_width: u32,
    pub image_height: u32,
    pub patch_width: u32,
    pub patch_height: u32,
    pub format: PatchFormat,
    /// Number of patch files written
    pub patches: u64,
    /// Number of edge patches that needed padding
    pub padded: u64,
}

/// Splits images into fixed-size patches on disk
#[derive(Debug, Clone)]
pub struct Splitter {
    patch_width: u32,
    patch_height: u32,
    prefix: String,
    format: PatchFormat,
}

impl Splitter {
    /// Create a splitter with the given patch size
    pub fn new(patch_width: u32, patch_height: u32) -> Result<Self> {
        if patch_width == 0 || patch_height == 0 {
            return Err(PatchError::InvalidPatchSize {
                width: patch_width,
                height: patch_height,
            });
        }

        Ok(Self {
            patch_width,
            patch_height,
            prefix: crate::DEFAULT_PREFIX.to_string(),
            format: PatchFormat::default(),
        })
    }

    /// Set filename prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set output format
    #[must_use]
    pub const fn with_format(mut self, format: PatchFormat) -> Self {
        self.format = format;
        self
    }

    pub const fn patch_size(&self) -> (u32, u32) {
        (self.patch_width, self.patch_height)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub const fn format(&self) -> PatchFormat {
        self.format
    }

    /// Split the image at `image_path` into `output_dir`
    pub fn split_file(&self, image_path: &Path, output_dir: &Path) -> Result<SplitSummary> {
        if !image_path.exists() {
            return Err(PatchError::InputNotFound(image_path.to_path_buf()));
        }

        let image = image::open(image_path)?.to_rgb8();
        let mut summary = self.split_image(&image, output_dir)?;

        info!(
            "{}: saved {} patches to '{}' ({}x{})",
            image_path
                .file_name()
                .map_or_else(|| image_path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            summary.patches,
            output_dir.display(),
            self.patch_width,
            self.patch_height
        );

        summary.source = Some(image_path.to_path_buf());
        Ok(summary)
    }

    /// Split an in-memory image into `output_dir`
    ///
    /// Existing files with the same names are overwritten.
    pub fn split_image(&self, image: &RgbImage, output_dir: &Path) -> Result<SplitSummary> {
        let (image_width, image_height) = image.dimensions();
        let grid = PatchGrid::new(image_width, image_height, self.patch_width, self.patch_height)?;

        fs::create_dir_all(output_dir)?;

        let mut written = 0;
        let mut padded = 0;

        for patch in grid.patches(image) {
            let file_name = patch
                .origin
                .name()
                .file_name(&self.prefix, self.format.extension());
            let path = output_dir.join(file_name);

            patch
                .image
                .save_with_format(&path, self.format.image_format())?;
            debug!("Wrote {}", path.display());

            written += 1;
            if patch.padded {
                padded += 1;
            }
        }

        Ok(SplitSummary {
            source: None,
            output_dir: output_dir.to_path_buf(),
            image_width,
            image_height,
            patch_width: self.patch_width,
            patch_height: self.patch_height,
            format: self.format,
            patches: written,
            padded,
        })
    }

    /// Split a single image or every image below a directory
    pub fn split_path(
        &self,
        input: &Path,
        output_root: &Path,
        per_image_subfolders: bool,
    ) -> Result<Vec<SplitSummary>> {
        plan_split(input, output_root, per_image_subfolders)?
            .iter()
            .map(|job| self.split_file(&job.source, &job.output_dir))
            .collect()
    }
}

/// Work out which images to split and where each one's patches go
///
/// A file input produces one job writing into `output_root`. A directory input is
/// searched recursively for supported images, sorted by path; with
/// `per_image_subfolders` each image writes into `output_root/<image-stem>`.
pub fn plan_split(
    input: &Path,
    output_root: &Path,
    per_image_subfolders: bool,
) -> Result<Vec<SplitJob>> {
    if !input.exists() {
        return Err(PatchError::InputNotFound(input.to_path_buf()));
    }

    if input.is_file() {
        return Ok(vec![SplitJob {
            source: input.to_path_buf(),
            output_dir: output_root.to_path_buf(),
        }]);
    }

    if !input.is_dir() {
        return Err(PatchError::UnsupportedInput(input.to_path_buf()));
    }

    let images = find_images_recursive(input)?;
    if images.is_empty() {
        return Err(PatchError::NoImagesFound(input.to_path_buf()));
    }

    Ok(images
        .into_iter()
        .map(|source| {
            let output_dir = match source.file_stem() {
                Some(stem) if per_image_subfolders => output_root.join(stem),
                _ => output_root.to_path_buf(),
            };
            SplitJob { source, output_dir }
        })
        .collect())
}
