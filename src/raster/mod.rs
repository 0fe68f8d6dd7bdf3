//! Pixel buffers shared by sheets, tiles and canvases

/// RGBA raster with crop, paste and uniformity checks
pub mod pixels;

pub use pixels::{CANVAS_FILL, PixelRaster};
