//! Image decoding and pluggable output encoders

use std::path::Path;

use image::imageops::{self, FilterType};
use image::error::{EncodingError, ImageFormatHint};
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat};

use crate::io::configuration::WEBP_MAX_DIMENSION;
use crate::io::error::{PipelineError, Result, WithPath, fs_error};
use crate::raster::PixelRaster;

/// Requested fidelity of an encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Exact pixels
    #[default]
    Lossless,
    /// Lossy compression at a quality from 0 to 100
    Lossy(u8),
}

/// Turns a raster into encoded file bytes
pub trait Encoder: Send + Sync {
    /// File extension written for this encoding, without the dot
    fn extension(&self) -> &'static str;

    /// Encode `raster` into file bytes
    ///
    /// Formats without a lossy mode ignore `quality`.
    ///
    /// # Errors
    ///
    /// Returns `ImageExport` if the encoder rejects the raster
    fn encode(&self, raster: &PixelRaster, quality: Quality) -> Result<Vec<u8>>;
}

/// Lossless PNG output
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl Encoder for PngEncoder {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn encode(&self, raster: &PixelRaster, _quality: Quality) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let image = raster.as_image();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(export_error)?;
        Ok(bytes)
    }
}

/// WebP output, downscaled when the raster exceeds the format limit
#[derive(Debug, Clone, Copy)]
pub struct WebpEncoder {
    max_dimension: u32,
}

impl Default for WebpEncoder {
    fn default() -> Self {
        Self::new(WEBP_MAX_DIMENSION)
    }
}

impl WebpEncoder {
    /// Create an encoder that shrinks rasters wider or taller than `max_dimension`
    pub const fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Dimensions after fitting `(width, height)` inside the size limit
    ///
    /// Aspect ratio is preserved; sizes already within the limit are unchanged.
    pub fn fitted_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let longest = width.max(height);
        if longest <= self.max_dimension || longest == 0 {
            return (width, height);
        }

        let scale = f64::from(self.max_dimension) / f64::from(longest);
        let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
        (fit(width), fit(height))
    }
}

impl Encoder for WebpEncoder {
    fn extension(&self) -> &'static str {
        "webp"
    }

    fn encode(&self, raster: &PixelRaster, quality: Quality) -> Result<Vec<u8>> {
        let (width, height) = raster.dimensions();
        let (fit_width, fit_height) = self.fitted_dimensions(width, height);

        let resized;
        let image = if (fit_width, fit_height) == (width, height) {
            raster.as_image()
        } else {
            log::info!("Downscaling {width}x{height} collage to {fit_width}x{fit_height} for WebP");
            resized = imageops::resize(raster.as_image(), fit_width, fit_height, FilterType::Lanczos3);
            &resized
        };

        match quality {
            Quality::Lossless => {
                let mut bytes = Vec::new();
                image::codecs::webp::WebPEncoder::new_lossless(&mut bytes)
                    .write_image(
                        image.as_raw(),
                        image.width(),
                        image.height(),
                        ExtendedColorType::Rgba8,
                    )
                    .map_err(export_error)?;
                Ok(bytes)
            }
            Quality::Lossy(percent) => {
                let encoded = webp::Encoder::from_rgba(image.as_raw(), image.width(), image.height())
                    .encode_simple(false, f32::from(percent.min(100)))
                    .map_err(|error| {
                        export_error(ImageError::Encoding(EncodingError::new(
                            ImageFormatHint::Exact(ImageFormat::WebP),
                            format!("{error:?}"),
                        )))
                    })?;
                Ok(encoded.to_vec())
            }
        }
    }
}

/// Encoding used for composed collages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Lossless PNG
    #[default]
    Png,
    /// WebP, lossless unless a lossy quality is requested
    Webp,
}

impl OutputFormat {
    /// Encoder implementing this format
    pub fn encoder(self) -> Box<dyn Encoder> {
        match self {
            Self::Png => Box::new(PngEncoder),
            Self::Webp => Box::new(WebpEncoder::default()),
        }
    }
}

fn export_error(source: image::ImageError) -> PipelineError {
    PipelineError::ImageExport {
        path: "<unknown>".into(),
        source,
    }
}

/// Decode any supported image file into an RGBA raster
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded
pub fn decode_raster(path: &Path) -> Result<PixelRaster> {
    let image = image::open(path).map_err(|e| PipelineError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(PixelRaster::from_image(image.to_rgba8()))
}

/// Write encoded bytes to `path`, creating the parent directory if needed
///
/// # Errors
///
/// Returns a file system error if the directory or file cannot be written
pub fn write_encoded(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fs_error(parent, "create directory", e))?;
    }
    std::fs::write(path, bytes).map_err(|e| fs_error(path, "write", e))
}

/// Encode `raster` with `encoder` at `quality` and write it to `path`
///
/// # Errors
///
/// Returns an error if encoding or writing fails
pub fn save_raster(
    path: &Path,
    raster: &PixelRaster,
    encoder: &dyn Encoder,
    quality: Quality,
) -> Result<()> {
    let bytes = encoder.encode(raster, quality).with_path(path)?;
    write_encoded(path, &bytes)
}
