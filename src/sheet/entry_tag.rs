//! Entry tag extraction: the character number badge in a base tile's corner

use std::path::{Path, PathBuf};

use log::info;

use crate::io::codec::{PngEncoder, Quality, save_raster};
use crate::io::configuration::{Config, SHEET_EXTENSION};
use crate::io::error::Result;
use crate::raster::PixelRaster;
use crate::sheet::identity::CharacterId;

/// Result of an extraction request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTag {
    /// The tag was cropped and written
    Created {
        /// Where the tag was written
        path: PathBuf,
        /// The tag raster with background made transparent
        raster: PixelRaster,
    },
    /// A tag for this character already existed and was left untouched
    Existing {
        /// Path of the existing tag
        path: PathBuf,
    },
}

impl EntryTag {
    /// Path of the tag file
    pub fn path(&self) -> &Path {
        match self {
            Self::Created { path, .. } | Self::Existing { path } => path,
        }
    }
}

/// Crops entry tags from base tiles, once per character
#[derive(Debug, Clone)]
pub struct EntryTagExtractor {
    tag_root: PathBuf,
    size: (u32, u32),
    background: [u8; 4],
}

impl EntryTagExtractor {
    /// Create an extractor writing into `tag_root`
    pub fn new(tag_root: impl Into<PathBuf>, size: (u32, u32), background: [u8; 4]) -> Self {
        Self {
            tag_root: tag_root.into(),
            size,
            background,
        }
    }

    /// Create an extractor from pipeline configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tag_root.clone(),
            config.entry_tag_size,
            config.tag_background(),
        )
    }

    /// Path of the tag file for `id`
    pub fn tag_path(&self, id: CharacterId) -> PathBuf {
        self.tag_root.join(format!("{id}.{SHEET_EXTENSION}"))
    }

    /// Crop and store the entry tag for `id` unless one already exists
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be encoded or written
    pub fn extract(&self, base: &PixelRaster, id: CharacterId) -> Result<EntryTag> {
        let path = self.tag_path(id);
        if path.exists() {
            return Ok(EntryTag::Existing { path });
        }

        let mut raster = base.crop_top_left(self.size.0, self.size.1);
        raster.make_transparent(self.background);

        save_raster(&path, &raster, &PngEncoder, Quality::Lossless)?;
        info!("Entry tag for character {id} saved to {}", path.display());

        Ok(EntryTag::Created { path, raster })
    }
}
