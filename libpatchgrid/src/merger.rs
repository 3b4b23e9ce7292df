use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbImage};
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{PatchError, Result};
use crate::format::list_images;
use crate::layout::GridLayout;
use crate::naming::{PatchName, PatchPattern};

/// How the merger treats gaps, overlaps and irregular patches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Paste whatever parses; later patches overwrite earlier ones and gaps stay black
    #[default]
    Lenient,
    /// Reject misaligned origins, overlaps, gaps and patches of the wrong size
    Strict,
}

/// Patch file whose name parsed into an origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFile {
    pub name: PatchName,
    pub path: PathBuf,
}

/// Image file in the patch directory whose name did not parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparsedPatch {
    pub path: PathBuf,
    pub reason: String,
}

/// Patch files found in a directory, sorted by file name
#[derive(Debug, Clone)]
pub struct PatchScan {
    pub dir: PathBuf,
    pub patches: Vec<PatchFile>,
    pub unparsed: Vec<UnparsedPatch>,
}

/// Outcome of a merge
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Where the canvas was saved, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub patch_width: u32,
    pub patch_height: u32,
    /// Number of patches pasted onto the canvas
    pub patches_used: usize,
    pub mode: MergeMode,
    pub unparsed: Vec<UnparsedPatch>,
    pub layout: GridLayout,
}

impl MergeReport {
    /// Number of image files skipped because their names did not parse
    pub fn unparsed_count(&self) -> usize {
        self.unparsed.len()
    }
}

/// Reconstructed image together with how it was built
#[derive(Debug, Clone)]
pub struct MergedCanvas {
    pub image: RgbImage,
    pub report: MergeReport,
}

/// Layout report for a patch directory, produced without decoding patch pixels
#[derive(Debug, Clone, Serialize)]
pub struct PatchDirReport {
    pub directory: PathBuf,
    pub prefix: String,
    pub patch_width: u32,
    pub patch_height: u32,
    /// Whether the patch size was read from the first patch
    pub patch_size_inferred: bool,
    pub patches: usize,
    pub complete: bool,
    pub unparsed: Vec<UnparsedPatch>,
    pub layout: GridLayout,
}

/// Reassembles a directory of named patches into one image
#[derive(Debug, Clone)]
pub struct Merger {
    pattern: PatchPattern,
    patch_size: Option<(u32, u32)>,
    mode: MergeMode,
}

impl Merger {
    /// Create a merger for patches named with `prefix`
    pub fn new(prefix: &str) -> Result<Self> {
        Ok(Self {
            pattern: PatchPattern::new(prefix)?,
            patch_size: None,
            mode: MergeMode::default(),
        })
    }

    /// Use an explicit patch size instead of reading it from the first patch
    pub fn with_patch_size(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PatchError::InvalidPatchSize { width, height });
        }
        self.patch_size = Some((width, height));
        Ok(self)
    }

    /// Set merge mode
    #[must_use]
    pub const fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn prefix(&self) -> &str {
        self.pattern.prefix()
    }

    pub const fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Find patch files directly inside `dir` and parse their names
    pub fn scan(&self, dir: &Path) -> Result<PatchScan> {
        if !dir.is_dir() {
            return Err(PatchError::NotADirectory(dir.to_path_buf()));
        }

        let files = list_images(dir)?;
        if files.is_empty() {
            return Err(PatchError::NoPatchFiles(dir.to_path_buf()));
        }

        let mut patches = Vec::new();
        let mut unparsed = Vec::new();

        for path in files {
            match self.pattern.parse_path(&path) {
                Ok(name) => patches.push(PatchFile { name, path }),
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    unparsed.push(UnparsedPatch {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if patches.is_empty() {
            return Err(PatchError::NoMatchingPatches {
                dir: dir.to_path_buf(),
                prefix: self.prefix().to_string(),
            });
        }

        if !unparsed.is_empty() {
            warn!(
                "{} image file(s) in {} do not follow the '{}_<id>_<top>_<left>' naming and were skipped",
                unparsed.len(),
                dir.display(),
                self.prefix()
            );
        }

        Ok(PatchScan {
            dir: dir.to_path_buf(),
            patches,
            unparsed,
        })
    }

    /// Explicit patch size, or the dimensions of the first patch in the scan
    pub fn resolve_patch_size(&self, scan: &PatchScan) -> Result<(u32, u32)> {
        if let Some(size) = self.patch_size {
            return Ok(size);
        }

        let first = scan
            .patches
            .first()
            .ok_or_else(|| PatchError::NoMatchingPatches {
                dir: scan.dir.clone(),
                prefix: self.prefix().to_string(),
            })?;

        let (width, height) = image::image_dimensions(&first.path)?;
        if width == 0 || height == 0 {
            return Err(PatchError::InvalidPatchSize { width, height });
        }

        debug!(
            "Inferred patch size {}x{} from {}",
            width,
            height,
            first.path.display()
        );
        Ok((width, height))
    }

    /// Report how the patches in `dir` would be laid out, without merging
    pub fn inspect(&self, dir: &Path) -> Result<PatchDirReport> {
        let scan = self.scan(dir)?;
        let (patch_width, patch_height) = self.resolve_patch_size(&scan)?;
        let layout = analyze(&scan, patch_width, patch_height)?;

        Ok(PatchDirReport {
            directory: scan.dir,
            prefix: self.prefix().to_string(),
            patch_width,
            patch_height,
            patch_size_inferred: self.patch_size.is_none(),
            patches: scan.patches.len(),
            complete: layout.is_complete(),
            unparsed: scan.unparsed,
            layout,
        })
    }

    /// Reassemble the patches in `dir` into an in-memory canvas
    pub fn compose(&self, dir: &Path) -> Result<MergedCanvas> {
        let scan = self.scan(dir)?;
        let (patch_width, patch_height) = self.resolve_patch_size(&scan)?;
        let layout = analyze(&scan, patch_width, patch_height)?;

        match self.mode {
            MergeMode::Strict => {
                layout.ensure_complete()?;
                check_patch_sizes(&scan, patch_width, patch_height)?;
            }
            MergeMode::Lenient => {
                if !layout.is_complete() {
                    warn!(
                        "Patch grid is irregular: {} missing cell(s), {} duplicate origin(s), {} misaligned origin(s)",
                        layout.missing_count,
                        layout.duplicates.len(),
                        layout.misaligned.len()
                    );
                }
            }
        }

        let (width, height) = match (
            u32::try_from(layout.canvas_width),
            u32::try_from(layout.canvas_height),
        ) {
            (Ok(width), Ok(height)) => (width, height),
            _ => {
                return Err(PatchError::CanvasTooLarge {
                    width: layout.canvas_width,
                    height: layout.canvas_height,
                })
            }
        };

        let mut canvas = RgbImage::new(width, height);
        for patch in &scan.patches {
            let tile = image::open(&patch.path)?.to_rgb8();
            imageops::replace(
                &mut canvas,
                &tile,
                i64::from(patch.name.left),
                i64::from(patch.name.top),
            );
            debug!(
                "Pasted {} at top={}, left={}",
                patch.path.display(),
                patch.name.top,
                patch.name.left
            );
        }

        let report = MergeReport {
            output: None,
            width,
            height,
            patch_width,
            patch_height,
            patches_used: scan.patches.len(),
            mode: self.mode,
            unparsed: scan.unparsed,
            layout,
        };

        Ok(MergedCanvas {
            image: canvas,
            report,
        })
    }

    /// Reassemble the patches in `dir` and save the result to `output`
    ///
    /// The output format follows the extension of `output`. Nothing is written
    /// when the directory has no usable patches.
    pub fn merge(&self, dir: &Path, output: &Path) -> Result<MergeReport> {
        let MergedCanvas { image, mut report } = self.compose(dir)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        image.save(output)?;

        info!(
            "Reconstructed image saved: {} (size {}x{}, from {} patches)",
            output.display(),
            report.width,
            report.height,
            report.patches_used
        );

        report.output = Some(output.to_path_buf());
        Ok(report)
    }
}

fn analyze(scan: &PatchScan, patch_width: u32, patch_height: u32) -> Result<GridLayout> {
    GridLayout::analyze(
        scan.patches.iter().map(|p| (p.name.top, p.name.left)),
        patch_width,
        patch_height,
    )
}

/// Header-only check that every patch has the expected size
fn check_patch_sizes(scan: &PatchScan, width: u32, height: u32) -> Result<()> {
    for patch in &scan.patches {
        let (actual_width, actual_height) = image::image_dimensions(&patch.path)?;
        if (actual_width, actual_height) != (width, height) {
            return Err(PatchError::PatchSizeMismatch {
                path: patch.path.clone(),
                width,
                height,
                actual_width,
                actual_height,
            });
        }
    }
    Ok(())
}
