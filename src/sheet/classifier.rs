//! Sheet segmentation and base/variant tile classification
//!
//! A sheet is a horizontal strip of fixed-size tiles. Scanning left to right,
//! uniform-colour tiles mark padding; the first populated tile of a new
//! character becomes its base and every later populated tile a variant.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::io::codec::decode_raster;
use crate::io::configuration::Config;
use crate::io::error::{PipelineError, Result};
use crate::raster::PixelRaster;
use crate::sheet::identity::SheetName;

/// What the scan does when it meets a background tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPolicy {
    /// Stop scanning the sheet; everything after is padding
    #[default]
    StopAtBackground,
    /// Skip the background tile and keep scanning
    SkipBackground,
}

/// A decoded raw sheet whose dimensions have been validated
#[derive(Debug, Clone)]
pub struct SourceSheet {
    path: PathBuf,
    name: SheetName,
    raster: PixelRaster,
    tile_width: u32,
    tile_height: u32,
}

impl SourceSheet {
    /// Validate a decoded sheet against the tile grid
    ///
    /// # Errors
    ///
    /// Returns `MalformedSheet` if the height differs from `tile_height` or the
    /// width is not a positive multiple of `tile_width`, and
    /// `InvalidCharacterId` if the file name carries no character number
    pub fn new(
        path: impl Into<PathBuf>,
        raster: PixelRaster,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self> {
        let path = path.into();
        let name = SheetName::from_path(&path)?;
        let (width, height) = raster.dimensions();

        if tile_width == 0 || width == 0 || width % tile_width != 0 || height != tile_height {
            return Err(PipelineError::MalformedSheet {
                path,
                width,
                height,
                tile_width,
                tile_height,
            });
        }

        Ok(Self {
            path,
            name,
            raster,
            tile_width,
            tile_height,
        })
    }

    /// Decode and validate the sheet at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be decoded or fails validation
    pub fn load(path: &Path, tile_width: u32, tile_height: u32) -> Result<Self> {
        let raster = decode_raster(path)?;
        Self::new(path, raster, tile_width, tile_height)
    }

    /// Path the sheet was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical key and character number
    pub const fn name(&self) -> &SheetName {
        &self.name
    }

    /// Number of tile slots across the sheet
    pub fn tile_count(&self) -> u32 {
        self.raster.width() / self.tile_width
    }

    /// Crop the tile in slot `index`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `index` is past the last slot
    pub fn tile(&self, index: u32) -> Result<PixelRaster> {
        let x = index.checked_mul(self.tile_width).unwrap_or(u32::MAX);
        self.raster.crop(x, 0, self.tile_width, self.tile_height)
    }
}

/// Tiles found on one sheet
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Canonical tile, only ever set for new characters
    pub base: Option<PixelRaster>,
    /// Alternate tiles in discovery order
    pub variants: Vec<PixelRaster>,
    /// The base is the first slot taken because no populated tile was found
    pub base_is_fallback: bool,
}

impl Classification {
    /// Total number of tiles emitted
    pub fn tile_count(&self) -> usize {
        self.variants.len() + usize::from(self.base.is_some())
    }
}

/// Splits sheets into base and variant tiles
#[derive(Debug, Clone, Copy, Default)]
pub struct TileClassifier {
    policy: ScanPolicy,
}

impl TileClassifier {
    /// Create a classifier with the given background policy
    pub const fn new(policy: ScanPolicy) -> Self {
        Self { policy }
    }

    /// Create a classifier from pipeline configuration
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.scan_policy)
    }

    /// Classify every tile slot of `sheet`
    ///
    /// For a new character the first populated tile is the base. For a known
    /// character slot 0 duplicates the stored base and is always skipped, so
    /// only variants are emitted.
    ///
    /// # Errors
    ///
    /// Returns an error only if a tile slot cannot be cropped
    pub fn classify(&self, sheet: &SourceSheet, is_new_character: bool) -> Result<Classification> {
        let mut classification = Classification::default();

        for index in 0..sheet.tile_count() {
            if !is_new_character && index == 0 {
                continue;
            }

            let tile = sheet.tile(index)?;
            if tile.is_uniform() {
                match self.policy {
                    ScanPolicy::StopAtBackground => {
                        debug!("{}: background at slot {index}, scan stopped", sheet.name());
                        break;
                    }
                    ScanPolicy::SkipBackground => continue,
                }
            }

            if is_new_character && classification.base.is_none() {
                classification.base = Some(tile);
            } else {
                classification.variants.push(tile);
            }
        }

        if is_new_character && classification.base.is_none() {
            warn!(
                "{}: no populated tile found, using the first slot as base",
                sheet.name()
            );
            classification.base = Some(sheet.tile(0)?);
            classification.base_is_fallback = true;
        }

        Ok(classification)
    }
}
