//! Pipeline constants and runtime configuration

use std::path::{Path, PathBuf};

use crate::io::codec::{OutputFormat, Quality};
use crate::io::error::{PipelineError, Result, fs_error, invalid_parameter};
use crate::sheet::classifier::ScanPolicy;

/// Width of a single pose tile in a character sheet
pub const TILE_WIDTH: u32 = 1200;
/// Height of a character sheet and of every tile cut from it
pub const TILE_HEIGHT: u32 = 1600;

/// Tiles per output row before wrapping
pub const DEFAULT_ROW_CAPACITY: usize = 10;

/// Upper bound on concurrent ingestion workers
pub const MAX_WORKERS: usize = 15;

/// How often an undecided variant selection is asked again
pub const MAX_SELECTION_REPLAYS: usize = 3;

// Longer output paths fall back to a generated identifier
/// Maximum length of an output path before the fallback name is used
pub const MAX_PATH_LENGTH: usize = 254;

/// Width of the entry tag cropped from the top-left of a base tile
pub const ENTRY_TAG_WIDTH: u32 = 125;
/// Height of the entry tag cropped from the top-left of a base tile
pub const ENTRY_TAG_HEIGHT: u32 = 100;

/// Sheet background colours: white-ish grey, darker grey, slightly darker grey
pub const BACKGROUND_COLOURS: [[u8; 4]; 3] = [
    [239, 239, 239, 255],
    [230, 230, 230, 255],
    [229, 229, 229, 255],
];

/// Largest identifier used for fallback output names
pub const FALLBACK_ID_MAX: u32 = 999_999;

// WebP cannot store images above 16383 pixels on either side
/// Largest output dimension written as WebP
pub const WEBP_MAX_DIMENSION: u32 = 16_000;

/// Extension of raw sheets and stored tiles
pub const SHEET_EXTENSION: &str = "png";
/// Extension of the empty marker recording an ingested sheet
pub const INGESTED_MARKER_EXTENSION: &str = "ingested";

/// Raw sheet directory name under the project root
pub const RAW_DIR_NAME: &str = "Originals";
/// Asset store directory name under the project root
pub const STORE_DIR_NAME: &str = "Character_Lists";
/// Base tile directory name under the asset store
pub const BASE_DIR_NAME: &str = "Base";
/// Variant tile directory name under the asset store
pub const VARIANT_DIR_NAME: &str = "Variant";
/// Entry tag directory name under the asset store
pub const TAG_DIR_NAME: &str = "Entry_Values";
/// Output directory name under the project root
pub const OUTPUT_DIR_NAME: &str = "Output";

/// Directory roots and tunables shared by every pipeline component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding raw character sheets
    pub raw_root: PathBuf,
    /// One subdirectory per character holding its base tile
    pub base_root: PathBuf,
    /// One subdirectory per character holding its variant tiles
    pub variant_root: PathBuf,
    /// One entry tag file per character
    pub tag_root: PathBuf,
    /// Composed collages are written here
    pub output_root: PathBuf,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile and sheet height in pixels
    pub tile_height: u32,
    /// Background colours; the first one is stripped from entry tags
    pub background_colours: Vec<[u8; 4]>,
    /// Tiles per row in composed collages
    pub row_capacity: usize,
    /// Upper bound on ingestion workers
    pub max_workers: usize,
    /// What the classifier does on a background tile
    pub scan_policy: ScanPolicy,
    /// Entry tag crop size (width, height)
    pub entry_tag_size: (u32, u32),
    /// Encoding of composed collages
    pub output_format: OutputFormat,
    /// Fidelity of composed collages
    pub output_quality: Quality,
}

impl Config {
    /// Build the default directory layout under `root`
    pub fn from_root(root: &Path) -> Self {
        let store = root.join(STORE_DIR_NAME);
        Self {
            raw_root: root.join(RAW_DIR_NAME),
            base_root: store.join(BASE_DIR_NAME),
            variant_root: store.join(VARIANT_DIR_NAME),
            tag_root: store.join(TAG_DIR_NAME),
            output_root: root.join(OUTPUT_DIR_NAME),
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            background_colours: BACKGROUND_COLOURS.to_vec(),
            row_capacity: DEFAULT_ROW_CAPACITY,
            max_workers: MAX_WORKERS,
            scan_policy: ScanPolicy::default(),
            entry_tag_size: (ENTRY_TAG_WIDTH, ENTRY_TAG_HEIGHT),
            output_format: OutputFormat::default(),
            output_quality: Quality::default(),
        }
    }

    /// Use different tile dimensions
    #[must_use]
    pub const fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    /// Reject values no component can work with
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a tile dimension, the row capacity or the
    /// worker count is zero, if the background palette is empty, or if a lossy
    /// quality exceeds 100
    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &format!("{}x{}", self.tile_width, self.tile_height),
                &"tile dimensions must be positive",
            ));
        }
        if self.row_capacity == 0 {
            return Err(invalid_parameter(
                "row_capacity",
                &self.row_capacity,
                &"at least one tile per row is required",
            ));
        }
        if self.max_workers == 0 {
            return Err(invalid_parameter(
                "max_workers",
                &self.max_workers,
                &"at least one worker is required",
            ));
        }
        if self.background_colours.is_empty() {
            return Err(invalid_parameter(
                "background_colours",
                &"[]",
                &"the palette needs at least one colour",
            ));
        }
        if let Quality::Lossy(percent) = self.output_quality
            && percent > 100
        {
            return Err(invalid_parameter(
                "output_quality",
                &percent,
                &"lossy quality ranges from 0 to 100",
            ));
        }
        Ok(())
    }

    /// Colour stripped to transparency when extracting entry tags
    pub fn tag_background(&self) -> [u8; 4] {
        self.background_colours
            .first()
            .copied()
            .unwrap_or(BACKGROUND_COLOURS[0])
    }

    /// Check the raw sheet root and create every other root
    ///
    /// # Errors
    ///
    /// Returns `MissingDirectory` when the raw sheet root does not exist, or a
    /// file system error if a store or output directory cannot be created
    pub fn prepare_directories(&self) -> Result<()> {
        if !self.raw_root.is_dir() {
            return Err(PipelineError::MissingDirectory {
                path: self.raw_root.clone(),
            });
        }

        for dir in [
            &self.base_root,
            &self.variant_root,
            &self.tag_root,
            &self.output_root,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| fs_error(dir, "create directory", e))?;
        }

        Ok(())
    }
}
