//! In-memory RGBA pixel buffer with cropping and pasting

use image::{Rgba, RgbaImage, imageops};

use crate::io::error::{Result, invalid_parameter};

/// Opaque black, the default canvas colour for composed collages
pub const CANVAS_FILL: [u8; 4] = [0, 0, 0, 255];

/// Rectangular RGBA raster
///
/// Every tile, sheet and canvas in the pipeline is held as a `PixelRaster`;
/// decoding and encoding live in [`crate::io::codec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRaster {
    image: RgbaImage,
}

impl PixelRaster {
    /// Create a fully transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Create a raster where every pixel is `colour`
    pub fn filled(width: u32, height: u32, colour: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(colour)),
        }
    }

    /// Wrap an already decoded image
    pub const fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Colour at `(x, y)`, or `None` outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Borrow the underlying image
    pub const fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the raster and return the underlying image
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Copy out the `width` x `height` region whose top-left corner is `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the region does not lie entirely inside
    /// the raster
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width());
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height());
        if !fits_x || !fits_y {
            return Err(invalid_parameter(
                "crop",
                &format!("{width}x{height}+{x}+{y}"),
                &format!("region exceeds {}x{} raster", self.width(), self.height()),
            ));
        }

        Ok(Self {
            image: imageops::crop_imm(&self.image, x, y, width, height).to_image(),
        })
    }

    /// Copy out the top-left region, shrunk to fit when the raster is smaller
    pub fn crop_top_left(&self, width: u32, height: u32) -> Self {
        let width = width.min(self.width());
        let height = height.min(self.height());
        Self {
            image: imageops::crop_imm(&self.image, 0, 0, width, height).to_image(),
        }
    }

    /// Draw `other` onto this raster with its top-left corner at `(x, y)`
    ///
    /// Pixels falling outside this raster are clipped.
    pub fn paste(&mut self, other: &Self, x: u32, y: u32) {
        imageops::replace(&mut self.image, &other.image, i64::from(x), i64::from(y));
    }

    /// True when every pixel equals the first pixel
    ///
    /// An empty raster counts as uniform.
    pub fn is_uniform(&self) -> bool {
        let mut pixels = self.image.pixels();
        pixels
            .next()
            .is_none_or(|first| pixels.all(|pixel| pixel == first))
    }

    /// Set alpha to zero on every pixel whose RGBA value equals `colour`
    ///
    /// Returns the number of pixels made transparent.
    pub fn make_transparent(&mut self, colour: [u8; 4]) -> usize {
        let mut cleared = 0;
        for pixel in self.image.pixels_mut() {
            if pixel.0 == colour {
                pixel.0[3] = 0;
                cleared += 1;
            }
        }
        cleared
    }
}
