//! Bulk lineup of every stored variant, one row per character

use log::info;

use crate::composition::engine::{CompositionEngine, CompositionMode, StoredArtifact, generated_name};
use crate::io::codec::decode_raster;
use crate::io::configuration::Config;
use crate::io::error::{PipelineError, Result};
use crate::raster::{CANVAS_FILL, PixelRaster};
use crate::store::{AssetStore, CharacterVariants};

/// Composes the variant lineup of the whole store
///
/// Rows follow store enumeration order. The canvas is as wide as the
/// character with the most variants; shorter rows keep the canvas fill.
#[derive(Debug, Clone)]
pub struct RowPerCharacterComposer {
    store: AssetStore,
    engine: CompositionEngine,
    tile_width: u32,
    tile_height: u32,
}

impl RowPerCharacterComposer {
    /// Create a composer reading `store` and writing through `engine`
    pub const fn new(
        store: AssetStore,
        engine: CompositionEngine,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        Self {
            store,
            engine,
            tile_width,
            tile_height,
        }
    }

    /// Create a composer from pipeline configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AssetStore::from_config(config),
            CompositionEngine::from_config(config),
            config.tile_width,
            config.tile_height,
        )
    }

    /// Paste every character's variants into its own row
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` when no variant tile is stored, or a
    /// decoding error for an unreadable tile
    pub fn render(&self, characters: &[CharacterVariants]) -> Result<PixelRaster> {
        let widest = characters
            .iter()
            .map(|character| character.tiles.len())
            .max()
            .unwrap_or(0);
        if widest == 0 {
            return Err(PipelineError::InvalidSourceData {
                reason: String::from("no variant tiles stored"),
            });
        }

        let width = to_u32(widest).saturating_mul(self.tile_width);
        let height = to_u32(characters.len()).saturating_mul(self.tile_height);
        let mut canvas = PixelRaster::filled(width, height, CANVAS_FILL);

        let mut y = 0;
        for character in characters {
            let mut x = 0;
            for tile in &character.tiles {
                canvas.paste(&decode_raster(tile)?, x, y);
                x = x.saturating_add(self.tile_width);
            }
            y = y.saturating_add(self.tile_height);
        }

        Ok(canvas)
    }

    /// Render the lineup and store it under a generated name
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, it holds no variants, or
    /// the collage cannot be written
    pub fn compose(&self) -> Result<StoredArtifact> {
        let characters = self.store.all_variants()?;
        let canvas = self.render(&characters)?;
        let artifact =
            self.engine
                .store(&canvas, &generated_name(CompositionMode::Variant), CompositionMode::Variant)?;
        info!(
            "Lineup of {} characters saved to {}",
            characters.len(),
            artifact.path.display()
        );
        Ok(artifact)
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
