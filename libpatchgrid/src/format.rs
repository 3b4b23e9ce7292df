use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::ImageFormat;
use serde::Serialize;

use crate::error::{PatchError, Result};
use crate::IMAGE_EXTENSIONS;

/// Output encodings the splitter can write patches in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchFormat {
    #[default]
    Png,
    Jpg,
    Jpeg,
}

impl PatchFormat {
    /// File extension written after the patch name, without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }

    /// Encoder used for this output format
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpg | Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    /// Whether decoding a written patch gives back the exact pixels
    pub const fn is_lossless(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl FromStr for PatchFormat {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" => Ok(Self::Jpg),
            "jpeg" => Ok(Self::Jpeg),
            _ => Err(PatchError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for PatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Check whether a path carries one of the supported raster extensions (case-insensitive)
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// List image files directly inside `dir`, sorted by file name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// List image files anywhere below `dir`, sorted by path
///
/// Symlinked directories are not descended into; symlinked image files are listed.
pub fn find_images_recursive(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
                && is_image_path(&path)
            {
                images.push(path);
            }
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_parse_format() {
        assert_eq!("png".parse::<PatchFormat>().unwrap(), PatchFormat::Png);
        assert_eq!("JPG".parse::<PatchFormat>().unwrap(), PatchFormat::Jpg);
        assert_eq!(".jpeg".parse::<PatchFormat>().unwrap(), PatchFormat::Jpeg);
        assert!(matches!(
            "tiff".parse::<PatchFormat>(),
            Err(PatchError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_jpeg_variants_share_encoder() {
        assert_eq!(PatchFormat::Jpg.image_format(), ImageFormat::Jpeg);
        assert_eq!(PatchFormat::Jpeg.image_format(), ImageFormat::Jpeg);
        assert_eq!(PatchFormat::Jpg.extension(), "jpg");
        assert!(!PatchFormat::Jpeg.is_lossless());
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("a/b/patch_0_0_0.PNG")));
        assert!(is_image_path(Path::new("scan.tif")));
        assert!(is_image_path(Path::new("scan.Tiff")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("README")));
    }

    #[test]
    fn test_find_images_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("b");
        fs::create_dir_all(&nested).unwrap();
        File::create(nested.join("z.png")).unwrap();
        File::create(dir.path().join("a.JPG")).unwrap();
        File::create(dir.path().join("skip.txt")).unwrap();

        let found = find_images_recursive(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("a.JPG"), nested.join("z.png")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_images_recursive_skips_symlinked_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = dir.path().join("inputs");
        fs::create_dir_all(&inputs).unwrap();
        File::create(inputs.join("a.png")).unwrap();
        std::os::unix::fs::symlink(&inputs, inputs.join("loop")).unwrap();
        std::os::unix::fs::symlink(inputs.join("a.png"), inputs.join("b.png")).unwrap();

        let found = find_images_recursive(&inputs).unwrap();
        assert_eq!(found, vec![inputs.join("a.png"), inputs.join("b.png")]);
    }

    #[test]
    fn test_list_images_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        File::create(nested.join("deep.png")).unwrap();
        File::create(dir.path().join("b.bmp")).unwrap();
        File::create(dir.path().join("a.png")).unwrap();

        let found = list_images(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.png"), dir.path().join("b.bmp")]
        );
    }
}
