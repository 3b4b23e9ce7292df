use std::path::PathBuf;

use thiserror::Error;

/// Result type for PatchGrid operations
pub type Result<T> = std::result::Result<T, PatchError>;

/// Errors that can occur while splitting or merging patches
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Patch directory not found: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Unsupported input path: {}", .0.display())]
    UnsupportedInput(PathBuf),

    #[error("No images found in the input folder: {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("No patch files found in {}", .0.display())]
    NoPatchFiles(PathBuf),

    #[error("No valid patch filenames found in {} (expected '{prefix}_<id>_<top>_<left>.<ext>')", .dir.display())]
    NoMatchingPatches { dir: PathBuf, prefix: String },

    #[error("Invalid patch size: {width}x{height}")]
    InvalidPatchSize { width: u32, height: u32 },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Patch origin top={top}, left={left} is not aligned to the {width}x{height} grid")]
    MisalignedPatch {
        top: u32,
        left: u32,
        width: u32,
        height: u32,
    },

    #[error("Overlapping patches at top={top}, left={left}")]
    OverlappingPatches { top: u32, left: u32 },

    #[error("Patch grid is incomplete: {missing} cell(s) missing, first at top={top}, left={left}")]
    IncompleteGrid { missing: usize, top: u32, left: u32 },

    #[error("Canvas of {width}x{height} pixels is too large")]
    CanvasTooLarge { width: u64, height: u64 },

    #[error("Patch {} is {actual_width}x{actual_height}, expected {width}x{height}", .path.display())]
    PatchSizeMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Invalid patch prefix pattern: {0}")]
    InvalidPrefix(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),
}

impl PatchError {
    /// Returns true if the error means the requested input does not exist or has the wrong kind
    pub const fn is_missing_input(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound(_) | Self::NotADirectory(_) | Self::UnsupportedInput(_)
        )
    }

    /// Returns true if the input existed but yielded nothing to work on
    pub const fn is_empty_result(&self) -> bool {
        matches!(
            self,
            Self::NoImagesFound(_) | Self::NoPatchFiles(_) | Self::NoMatchingPatches { .. }
        )
    }

    /// Returns true if strict merge validation rejected the patch layout
    pub const fn is_layout_violation(&self) -> bool {
        matches!(
            self,
            Self::MisalignedPatch { .. }
                | Self::OverlappingPatches { .. }
                | Self::IncompleteGrid { .. }
                | Self::PatchSizeMismatch { .. }
        )
    }

    /// Process exit code for the command-line tools
    pub const fn exit_code(&self) -> i32 {
        if self.is_missing_input() {
            2
        } else {
            1
        }
    }
}
