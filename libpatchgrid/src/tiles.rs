use image::{imageops, RgbImage};

use crate::error::{PatchError, Result};
use crate::naming::PatchName;

/// Position of a patch within its source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchOrigin {
    /// Row-major sequence id
    pub id: u64,
    /// Pixel row of the top edge
    pub top: u32,
    /// Pixel column of the left edge
    pub left: u32,
}

impl PatchOrigin {
    /// Filename identity for this origin
    pub const fn name(&self) -> PatchName {
        PatchName::new(self.id, self.top, self.left)
    }
}

/// Patch data cut from a source image
#[derive(Debug, Clone)]
pub struct Patch {
    pub origin: PatchOrigin,
    /// Patch pixels, always the full patch size
    pub image: RgbImage,
    /// Whether the source crop was smaller than the patch and got padded
    pub padded: bool,
}

impl Patch {
    /// Get patch dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Row-major grid of fixed-size patches covering an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    image_width: u32,
    image_height: u32,
    patch_width: u32,
    patch_height: u32,
}

impl PatchGrid {
    /// Create a grid; patch dimensions must be non-zero
    pub fn new(
        image_width: u32,
        image_height: u32,
        patch_width: u32,
        patch_height: u32,
    ) -> Result<Self> {
        if patch_width == 0 || patch_height == 0 {
            return Err(PatchError::InvalidPatchSize {
                width: patch_width,
                height: patch_height,
            });
        }

        Ok(Self {
            image_width,
            image_height,
            patch_width,
            patch_height,
        })
    }

    pub const fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub const fn patch_size(&self) -> (u32, u32) {
        (self.patch_width, self.patch_height)
    }

    /// Number of patch columns, counting a partial right column
    pub const fn columns(&self) -> u32 {
        self.image_width.div_ceil(self.patch_width)
    }

    /// Number of patch rows, counting a partial bottom row
    pub const fn rows(&self) -> u32 {
        self.image_height.div_ceil(self.patch_height)
    }

    /// Total number of patches
    pub const fn len(&self) -> u64 {
        self.columns() as u64 * self.rows() as u64
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the image rebuilt from every padded patch
    pub const fn canvas_size(&self) -> (u64, u64) {
        (
            self.columns() as u64 * self.patch_width as u64,
            self.rows() as u64 * self.patch_height as u64,
        )
    }

    /// Patch origins in row-major order, with sequence ids
    pub fn origins(&self) -> impl Iterator<Item = PatchOrigin> + '_ {
        let columns = self.columns();
        (0..self.rows())
            .flat_map(move |row| (0..columns).map(move |column| (row, column)))
            .zip(0u64..)
            .map(move |((row, column), id)| PatchOrigin {
                id,
                top: row * self.patch_height,
                left: column * self.patch_width,
            })
    }

    /// Cut the patch at `origin` out of `image`, padding edge patches with black
    ///
    /// `origin` must come from [`PatchGrid::origins`] and `image` must have the grid's image size.
    pub fn extract(&self, image: &RgbImage, origin: PatchOrigin) -> Patch {
        let width = self.patch_width.min(self.image_width - origin.left);
        let height = self.patch_height.min(self.image_height - origin.top);

        let crop = imageops::crop_imm(image, origin.left, origin.top, width, height).to_image();

        // Pad patch to full patch size if necessary
        let padded = width < self.patch_width || height < self.patch_height;
        let image = if padded {
            let mut full = RgbImage::new(self.patch_width, self.patch_height);
            imageops::replace(&mut full, &crop, 0, 0);
            full
        } else {
            crop
        };

        Patch {
            origin,
            image,
            padded,
        }
    }

    /// Cut every patch of `image` in row-major order
    pub fn patches<'a>(&'a self, image: &'a RgbImage) -> impl Iterator<Item = Patch> + 'a {
        self.origins().map(move |origin| self.extract(image, origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_rejects_zero_patch_size() {
        assert!(matches!(
            PatchGrid::new(10, 10, 0, 5),
            Err(PatchError::InvalidPatchSize { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_reference_grid() {
        let grid = PatchGrid::new(3000, 2000, 1920, 1080).unwrap();
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.canvas_size(), (3840, 2160));

        let origins: Vec<(u64, u32, u32)> =
            grid.origins().map(|o| (o.id, o.top, o.left)).collect();
        assert_eq!(
            origins,
            vec![(0, 0, 0), (1, 0, 1920), (2, 1080, 0), (3, 1080, 1920)]
        );
    }

    #[test]
    fn test_exact_fit_has_no_padding() {
        let image = gradient(8, 4);
        let grid = PatchGrid::new(8, 4, 4, 2).unwrap();
        assert!(grid.patches(&image).all(|p| !p.padded));
    }

    #[test]
    fn test_empty_image_has_no_patches() {
        let grid = PatchGrid::new(0, 0, 16, 16).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.origins().count(), 0);
    }

    #[test]
    fn test_edge_patch_is_padded() {
        let image = gradient(5, 3);
        let grid = PatchGrid::new(5, 3, 4, 2).unwrap();

        let last = grid.patches(&image).last().unwrap();
        assert_eq!(last.origin.top, 2);
        assert_eq!(last.origin.left, 4);
        assert!(last.padded);
        assert_eq!(last.dimensions(), (4, 2));

        // The single source pixel lands at the patch origin, the rest is background
        assert_eq!(last.image.get_pixel(0, 0), image.get_pixel(4, 2));
        assert_eq!(*last.image.get_pixel(1, 0), Rgb([0, 0, 0]));
        assert_eq!(*last.image.get_pixel(0, 1), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_patch_content_matches_source() {
        let image = gradient(10, 10);
        let grid = PatchGrid::new(10, 10, 4, 4).unwrap();

        for patch in grid.patches(&image) {
            let (pw, ph) = patch.dimensions();
            for y in 0..ph {
                for x in 0..pw {
                    let (sx, sy) = (patch.origin.left + x, patch.origin.top + y);
                    if sx < 10 && sy < 10 {
                        assert_eq!(patch.image.get_pixel(x, y), image.get_pixel(sx, sy));
                    }
                }
            }
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_patch_count(
                width in 1u32..5000,
                height in 1u32..5000,
                pw in 32u32..2000,
                ph in 32u32..2000,
            ) {
                let grid = PatchGrid::new(width, height, pw, ph)?;
                let expected = u64::from(width.div_ceil(pw)) * u64::from(height.div_ceil(ph));
                prop_assert_eq!(grid.len(), expected);
                prop_assert_eq!(grid.origins().count() as u64, expected);
            }

            #[test]
            fn test_origins_on_grid(
                width in 1u32..3000,
                height in 1u32..3000,
                pw in 16u32..1000,
                ph in 16u32..1000,
            ) {
                let grid = PatchGrid::new(width, height, pw, ph)?;
                for (index, origin) in grid.origins().enumerate() {
                    prop_assert_eq!(origin.id, index as u64);
                    prop_assert_eq!(origin.top % ph, 0);
                    prop_assert_eq!(origin.left % pw, 0);
                    prop_assert!(origin.top < height);
                    prop_assert!(origin.left < width);
                }
            }
        }
    }
}
