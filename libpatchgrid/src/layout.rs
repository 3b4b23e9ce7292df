//! Consistency analysis for a set of patch origins.
//!
//! The merger only needs the largest origin to size its canvas, but a directory
//! of patches can also have holes, repeated origins, or origins that do not sit
//! on the patch grid at all. [`GridLayout`] records all three so strict merges
//! can reject them and `inspect` can report them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{PatchError, Result};

/// Cap on listed missing cells; the full count is always kept
pub const MAX_LISTED_CELLS: usize = 100;

/// Pixel origin of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CellOrigin {
    pub top: u32,
    pub left: u32,
}

/// Canvas size and grid coverage for a set of patch origins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub patch_width: u32,
    pub patch_height: u32,
    pub canvas_width: u64,
    pub canvas_height: u64,
    /// Grid columns spanned by the canvas
    pub columns: u64,
    /// Grid rows spanned by the canvas
    pub rows: u64,
    /// Number of origins analysed
    pub patches: usize,
    /// Number of grid cells no patch covers
    pub missing_count: u64,
    /// First uncovered cells in row-major order
    pub missing: Vec<CellOrigin>,
    /// Origins claimed by more than one patch
    pub duplicates: Vec<CellOrigin>,
    /// Origins that are not multiples of the patch size
    pub misaligned: Vec<CellOrigin>,
}

impl GridLayout {
    /// Analyse `origins` as `(top, left)` pairs for patches of `patch_width` x `patch_height`
    pub fn analyze(
        origins: impl IntoIterator<Item = (u32, u32)>,
        patch_width: u32,
        patch_height: u32,
    ) -> Result<Self> {
        if patch_width == 0 || patch_height == 0 {
            return Err(PatchError::InvalidPatchSize {
                width: patch_width,
                height: patch_height,
            });
        }

        let mut counts: BTreeMap<CellOrigin, usize> = BTreeMap::new();
        let mut patches = 0;
        for (top, left) in origins {
            *counts.entry(CellOrigin { top, left }).or_default() += 1;
            patches += 1;
        }

        let (pw, ph) = (u64::from(patch_width), u64::from(patch_height));
        let max_left = counts.keys().map(|c| u64::from(c.left)).max();
        let max_top = counts.keys().map(|c| u64::from(c.top)).max();

        let (canvas_width, canvas_height) = match (max_left, max_top) {
            (Some(left), Some(top)) => (left + pw, top + ph),
            _ => (0, 0),
        };
        let columns = canvas_width.div_ceil(pw);
        let rows = canvas_height.div_ceil(ph);

        let duplicates = counts
            .iter()
            .filter(|(_, n)| **n > 1)
            .map(|(&cell, _)| cell)
            .collect();

        let misaligned: Vec<CellOrigin> = counts
            .keys()
            .filter(|c| c.top % patch_height != 0 || c.left % patch_width != 0)
            .copied()
            .collect();

        let covered: BTreeSet<(u64, u64)> = counts
            .keys()
            .filter(|c| c.top % patch_height == 0 && c.left % patch_width == 0)
            .map(|c| (u64::from(c.top) / ph, u64::from(c.left) / pw))
            .collect();

        let missing_count = rows.saturating_mul(columns) - covered.len() as u64;
        let missing = first_missing(&covered, rows, columns, pw, ph);

        Ok(Self {
            patch_width,
            patch_height,
            canvas_width,
            canvas_height,
            columns,
            rows,
            patches,
            missing_count,
            missing,
            duplicates,
            misaligned,
        })
    }

    /// True when every grid cell is covered exactly once by an aligned patch
    pub fn is_complete(&self) -> bool {
        self.missing_count == 0 && self.duplicates.is_empty() && self.misaligned.is_empty()
    }

    /// Fail on the first misaligned origin, overlap, or gap
    pub fn ensure_complete(&self) -> Result<()> {
        if let Some(cell) = self.misaligned.first() {
            return Err(PatchError::MisalignedPatch {
                top: cell.top,
                left: cell.left,
                width: self.patch_width,
                height: self.patch_height,
            });
        }

        if let Some(cell) = self.duplicates.first() {
            return Err(PatchError::OverlappingPatches {
                top: cell.top,
                left: cell.left,
            });
        }

        if let Some(cell) = self.missing.first() {
            return Err(PatchError::IncompleteGrid {
                missing: usize::try_from(self.missing_count).unwrap_or(usize::MAX),
                top: cell.top,
                left: cell.left,
            });
        }

        Ok(())
    }
}

/// Walk the grid row-major and collect uncovered cells, stopping at the listing cap
fn first_missing(
    covered: &BTreeSet<(u64, u64)>,
    rows: u64,
    columns: u64,
    pw: u64,
    ph: u64,
) -> Vec<CellOrigin> {
    let mut missing = Vec::new();

    'rows: for row in 0..rows {
        for column in 0..columns {
            if covered.contains(&(row, column)) {
                continue;
            }
            // Cells past u32 pixel range cannot be named by a patch file
            let (Ok(top), Ok(left)) = (u32::try_from(row * ph), u32::try_from(column * pw)) else {
                break 'rows;
            };
            missing.push(CellOrigin { top, left });
            if missing.len() == MAX_LISTED_CELLS {
                break 'rows;
            }
        }
    }

    missing
}
