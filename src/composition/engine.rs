//! Grid composition of resolved tiles into one stored collage

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::Rng;

use crate::composition::layout::GridLayout;
use crate::io::codec::{OutputFormat, Quality, decode_raster, save_raster};
use crate::io::configuration::{Config, FALLBACK_ID_MAX, MAX_PATH_LENGTH};
use crate::io::error::{PipelineError, Result};
use crate::raster::{CANVAS_FILL, PixelRaster};

/// Which kind of tiles a collage holds; picks the fallback name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    /// Base tiles only
    Base,
    /// Variant tiles only
    Variant,
    /// Base and variant tiles together
    Merged,
}

impl CompositionMode {
    /// Suffix appended to fallback names
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Base => "_nude",
            Self::Variant => "_clothed",
            Self::Merged => "_merged",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Variant => write!(f, "variant"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A written collage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Where the collage was written
    pub path: PathBuf,
    /// The descriptive name that was requested
    pub intended_name: String,
    /// The descriptive name was too long and a generated one was used
    pub used_fallback: bool,
}

/// Lays tiles out in wrapping rows and writes the canvas
#[derive(Debug, Clone)]
pub struct CompositionEngine {
    output_dir: PathBuf,
    row_capacity: usize,
    tile_width: u32,
    tile_height: u32,
    format: OutputFormat,
    quality: Quality,
}

impl CompositionEngine {
    /// Create an engine writing into `output_dir`
    pub fn new(
        output_dir: impl Into<PathBuf>,
        row_capacity: usize,
        tile_width: u32,
        tile_height: u32,
        format: OutputFormat,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            row_capacity,
            tile_width,
            tile_height,
            format,
            quality: Quality::Lossless,
        }
    }

    /// Create an engine from pipeline configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output_root.clone(),
            config.row_capacity,
            config.tile_width,
            config.tile_height,
            config.output_format,
        )
        .with_quality(config.output_quality)
    }

    /// Encode collages at `quality` instead of losslessly
    #[must_use]
    pub const fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Directory receiving collages
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Grid geometry for `count` tiles
    pub fn layout(&self, count: usize) -> GridLayout {
        GridLayout::new(count, self.row_capacity, self.tile_width, self.tile_height)
    }

    /// Paste `tiles` onto a fresh canvas in row-major order
    pub fn render(&self, tiles: &[PixelRaster]) -> PixelRaster {
        let layout = self.layout(tiles.len());
        let (width, height) = layout.canvas_size();
        let mut canvas = PixelRaster::filled(width, height, CANVAS_FILL);
        for (tile, (x, y)) in tiles.iter().zip(layout.positions()) {
            canvas.paste(tile, x, y);
        }
        canvas
    }

    /// Compose `tiles` and store the collage as `target_name`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` for an empty tile list, `InvalidParameter`
    /// if even the fallback path is too long, or any encoding or writing error
    pub fn compose(
        &self,
        tiles: &[PixelRaster],
        target_name: &str,
        mode: CompositionMode,
    ) -> Result<StoredArtifact> {
        if tiles.is_empty() {
            return Err(PipelineError::InvalidSourceData {
                reason: format!("no tiles to compose for {target_name}"),
            });
        }

        let canvas = self.render(tiles);
        let artifact = self.store(&canvas, target_name, mode)?;
        info!(
            "Composed {} {mode} tiles into {}",
            tiles.len(),
            artifact.path.display()
        );
        Ok(artifact)
    }

    /// Encode a finished canvas into the output directory as `target_name`
    ///
    /// # Errors
    ///
    /// Returns an error if no usable path exists or writing fails
    pub fn store(
        &self,
        canvas: &PixelRaster,
        target_name: &str,
        mode: CompositionMode,
    ) -> Result<StoredArtifact> {
        let (path, used_fallback) = self.artifact_path(target_name, mode)?;
        let encoder = self.format.encoder();
        save_raster(&path, canvas, encoder.as_ref(), self.quality)?;

        Ok(StoredArtifact {
            path,
            intended_name: target_name.to_string(),
            used_fallback,
        })
    }

    /// Decode `paths` and compose them like [`CompositionEngine::compose`]
    ///
    /// # Errors
    ///
    /// Returns an error if a tile cannot be decoded or composition fails
    pub fn compose_files(
        &self,
        paths: &[PathBuf],
        target_name: &str,
        mode: CompositionMode,
    ) -> Result<StoredArtifact> {
        let tiles = paths
            .iter()
            .map(|path| decode_raster(path))
            .collect::<Result<Vec<_>>>()?;
        self.compose(&tiles, target_name, mode)
    }

    /// Output path for `target_name`, or a generated one when it is too long
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the generated path is still too long
    pub fn artifact_path(&self, target_name: &str, mode: CompositionMode) -> Result<(PathBuf, bool)> {
        let extension = self.format.encoder().extension();
        let intended = self
            .output_dir
            .join(format!("{target_name}.{extension}"));
        if path_length(&intended) <= MAX_PATH_LENGTH {
            return Ok((intended, false));
        }

        let fallback = self
            .output_dir
            .join(format!("{}.{extension}", generated_name(mode)));
        if path_length(&fallback) > MAX_PATH_LENGTH {
            return Err(PipelineError::InvalidParameter {
                parameter: "output_dir",
                value: self.output_dir.display().to_string(),
                reason: format!("output paths must fit in {MAX_PATH_LENGTH} characters"),
            });
        }

        warn!(
            "Output name too long ({} characters), saving as {}",
            path_length(&intended),
            fallback.display()
        );
        Ok((fallback, true))
    }
}

/// Random identifier followed by the mode suffix, e.g. `48213_merged`
pub fn generated_name(mode: CompositionMode) -> String {
    let id = rand::rng().random_range(1..=FALLBACK_ID_MAX);
    format!("{id}{}", mode.suffix())
}

fn path_length(path: &Path) -> usize {
    path.to_string_lossy().chars().count()
}
