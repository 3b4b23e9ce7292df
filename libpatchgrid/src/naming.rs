//! Patch filename encoding.
//!
//! Every patch is written as `<prefix>_<id>_<top>_<left>.<ext>`, for example
//! `patch_3_1080_1920.png`. The `id` is the row-major sequence number assigned
//! by the splitter and is informational only; `top` and `left` are the pixel
//! origin of the patch in the source image and are all the merger relies on.
//!
//! Matching is a case-insensitive search over the file stem, so `PATCH_0_0_0`
//! and `scan_patch_0_0_0` both resolve with prefix `patch`.

use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::error::Result;

/// Identity of a patch as encoded in its filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchName {
    /// Row-major sequence id
    pub id: u64,
    /// Pixel row of the patch origin
    pub top: u32,
    /// Pixel column of the patch origin
    pub left: u32,
}

impl PatchName {
    pub const fn new(id: u64, top: u32, left: u32) -> Self {
        Self { id, top, left }
    }

    /// Render the file name for this patch
    pub fn file_name(&self, prefix: &str, extension: &str) -> String {
        format!(
            "{}_{}_{}_{}.{}",
            prefix, self.id, self.top, self.left, extension
        )
    }
}

/// Reason a file could not be read as a patch name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameParseError {
    #[error("file name has no stem")]
    MissingStem,

    #[error("stem '{0}' does not match '<prefix>_<id>_<top>_<left>'")]
    NoMatch(String),

    #[error("{field} value '{value}' is out of range")]
    OutOfRange { field: &'static str, value: String },
}

/// Compiled filename matcher for a given prefix
#[derive(Debug, Clone)]
pub struct PatchPattern {
    prefix: String,
    regex: Regex,
}

impl PatchPattern {
    /// Build the matcher for `prefix`; the prefix is matched literally
    pub fn new(prefix: &str) -> Result<Self> {
        let source = format!(r"(?i){}_([0-9]+)_([0-9]+)_([0-9]+)", regex::escape(prefix));
        let regex = Regex::new(&source)?;
        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    /// Prefix this pattern was built for
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse a file stem such as `patch_0_1080_0`
    pub fn parse_stem(&self, stem: &str) -> std::result::Result<PatchName, NameParseError> {
        let captures = self
            .regex
            .captures(stem)
            .ok_or_else(|| NameParseError::NoMatch(stem.to_string()))?;

        let id = parse_field::<u64>("id", &captures[1])?;
        let top = parse_field::<u32>("top", &captures[2])?;
        let left = parse_field::<u32>("left", &captures[3])?;

        Ok(PatchName::new(id, top, left))
    }

    /// Parse the stem of a path
    pub fn parse_path(&self, path: &Path) -> std::result::Result<PatchName, NameParseError> {
        let stem = path
            .file_stem()
            .ok_or(NameParseError::MissingStem)?
            .to_string_lossy();
        self.parse_stem(&stem)
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> std::result::Result<T, NameParseError> {
    value.parse().map_err(|_| NameParseError::OutOfRange {
        field,
        value: value.to_string(),
    })
}
