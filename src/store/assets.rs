//! On-disk asset store: base and variant tiles per character
//!
//! Layout under the two roots:
//!
//! ```text
//! Base/<sheet>/<sheet>.png             canonical tile of a character
//! Variant/<sheet>/<sheet>_00.png ...   variant tiles cut from <sheet>
//! Variant/<sheet>/<other>_00.png ...   variants from further costume sheets
//! Variant/<sheet>/<other>.ingested     empty marker per ingested sheet
//! ```
//!
//! Directories are named after the canonical sheet of the character, so the
//! character number is recovered by parsing the directory name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::io::codec::{PngEncoder, Quality, save_raster};
use crate::io::configuration::{Config, INGESTED_MARKER_EXTENSION, SHEET_EXTENSION};
use crate::io::error::{Result, WithPath, fs_error};
use crate::raster::PixelRaster;
use crate::sheet::identity::{CharacterId, SheetName, parse_character_id};

/// Variant tiles stored for one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterVariants {
    /// Character number parsed from the directory name
    pub id: CharacterId,
    /// The character's variant directory
    pub dir: PathBuf,
    /// Stored variant tile files, sorted by name
    pub tiles: Vec<PathBuf>,
}

/// Snapshot of what the store already holds, used for ingestion planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreInventory {
    base_stems: BTreeSet<String>,
    bases: BTreeMap<CharacterId, SheetName>,
    variant_stems: BTreeSet<String>,
    variant_dirs: BTreeMap<CharacterId, PathBuf>,
    ingested: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl StoreInventory {
    /// True when a base directory is named after `stem`
    pub fn is_known_base(&self, stem: &str) -> bool {
        self.base_stems.contains(stem)
    }

    /// True when any variant directory records `stem` as ingested
    pub fn is_known_variant(&self, stem: &str) -> bool {
        self.variant_stems.contains(stem)
    }

    /// Established variant directory for `id`, if any
    pub fn variant_dir(&self, id: CharacterId) -> Option<&Path> {
        self.variant_dirs.get(&id).map(PathBuf::as_path)
    }

    /// True when `dir` records `stem` as ingested
    pub fn has_ingested(&self, dir: &Path, stem: &str) -> bool {
        self.ingested
            .get(dir)
            .is_some_and(|stems| stems.contains(stem))
    }

    /// Sheet whose stored base tile represents `id`
    pub fn base_sheet(&self, id: CharacterId) -> Option<&SheetName> {
        self.bases.get(&id)
    }

    /// Canonical sheet of every stored character, by character number
    pub fn base_sheets(&self) -> impl Iterator<Item = &SheetName> {
        self.bases.values()
    }
}

/// Character-keyed tile storage rooted in two directories
#[derive(Debug, Clone)]
pub struct AssetStore {
    base_root: PathBuf,
    variant_root: PathBuf,
}

impl AssetStore {
    /// Create a store over existing or future root directories
    pub fn new(base_root: impl Into<PathBuf>, variant_root: impl Into<PathBuf>) -> Self {
        Self {
            base_root: base_root.into(),
            variant_root: variant_root.into(),
        }
    }

    /// Create a store from pipeline configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_root.clone(), config.variant_root.clone())
    }

    /// Root holding one directory per character base
    pub fn base_root(&self) -> &Path {
        &self.base_root
    }

    /// Root holding one directory per character's variants
    pub fn variant_root(&self) -> &Path {
        &self.variant_root
    }

    /// Variant directory that `canonical` establishes for its character
    pub fn variant_dir_for(&self, canonical: &SheetName) -> PathBuf {
        self.variant_root.join(&canonical.stem)
    }

    /// Store the base tile of a new character
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn put_base(&self, sheet: &SheetName, tile: &PixelRaster) -> Result<PathBuf> {
        let path = self
            .base_root
            .join(&sheet.stem)
            .join(format!("{}.{SHEET_EXTENSION}", sheet.stem));
        save_raster(&path, tile, &PngEncoder, Quality::Lossless)?;
        Ok(path)
    }

    /// Store the variant tiles cut from `sheet` in `dir` and mark the sheet ingested
    ///
    /// The marker is written even when `tiles` is empty so the sheet is not
    /// planned again.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any file cannot be written
    pub fn put_variants(
        &self,
        dir: &Path,
        sheet: &SheetName,
        tiles: &[PixelRaster],
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).with_operation(dir, "create directory")?;

        let mut written = Vec::with_capacity(tiles.len());
        for (index, tile) in tiles.iter().enumerate() {
            let path = dir.join(format!("{}_{index:02}.{SHEET_EXTENSION}", sheet.stem));
            save_raster(&path, tile, &PngEncoder, Quality::Lossless)?;
            written.push(path);
        }

        let marker = dir.join(format!("{}.{INGESTED_MARKER_EXTENSION}", sheet.stem));
        std::fs::write(&marker, b"").with_operation(&marker, "write marker")?;

        Ok(written)
    }

    /// Snapshot the store for planning
    ///
    /// Missing roots are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns a file system error if a root exists but cannot be listed
    pub fn inventory(&self) -> Result<StoreInventory> {
        let mut inventory = StoreInventory::default();

        for dir in list_dirs(&self.base_root)? {
            let Some(stem) = file_name(&dir) else {
                continue;
            };
            inventory.base_stems.insert(stem.to_string());
            if let Ok(sheet) = SheetName::from_stem(stem) {
                inventory.bases.entry(sheet.id).or_insert(sheet);
            }
        }

        for dir in list_dirs(&self.variant_root)? {
            let Some(name) = file_name(&dir) else {
                continue;
            };
            match parse_character_id(name) {
                Ok(id) => {
                    inventory.variant_dirs.entry(id).or_insert_with(|| dir.clone());
                }
                Err(_) => warn!("Ignoring variant directory without a character number: {name}"),
            }

            let stems = ingested_stems(&dir)?;
            inventory.variant_stems.extend(stems.iter().cloned());
            inventory.ingested.insert(dir, stems);
        }

        debug!(
            "Store holds {} bases and {} variant directories",
            inventory.bases.len(),
            inventory.variant_dirs.len()
        );
        Ok(inventory)
    }

    /// Stored base tile for `id`, if any
    ///
    /// # Errors
    ///
    /// Returns a file system error if a directory cannot be listed
    pub fn base_tile(&self, id: CharacterId) -> Result<Option<PathBuf>> {
        let Some(dir) = find_character_dir(&self.base_root, id)? else {
            return Ok(None);
        };
        Ok(list_tiles(&dir)?.into_iter().next())
    }

    /// Stored variant tiles for `id`, sorted by file name
    ///
    /// # Errors
    ///
    /// Returns a file system error if a directory cannot be listed
    pub fn variant_tiles(&self, id: CharacterId) -> Result<Vec<PathBuf>> {
        find_character_dir(&self.variant_root, id)?
            .map_or_else(|| Ok(Vec::new()), |dir| list_tiles(&dir))
    }

    /// Base tile of every stored character, in directory order
    ///
    /// # Errors
    ///
    /// Returns a file system error if a directory cannot be listed
    pub fn all_bases(&self) -> Result<Vec<(CharacterId, PathBuf)>> {
        let mut bases = Vec::new();
        for dir in list_dirs(&self.base_root)? {
            let Some(id) = file_name(&dir).and_then(|name| parse_character_id(name).ok()) else {
                continue;
            };
            if let Some(tile) = list_tiles(&dir)?.into_iter().next() {
                bases.push((id, tile));
            }
        }
        Ok(bases)
    }

    /// Variant tiles of every stored character, in directory order
    ///
    /// # Errors
    ///
    /// Returns a file system error if a directory cannot be listed
    pub fn all_variants(&self) -> Result<Vec<CharacterVariants>> {
        let mut characters = Vec::new();
        for dir in list_dirs(&self.variant_root)? {
            let Some(id) = file_name(&dir).and_then(|name| parse_character_id(name).ok()) else {
                continue;
            };
            let tiles = list_tiles(&dir)?;
            characters.push(CharacterVariants { id, dir, tiles });
        }
        Ok(characters)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(extension)
}

fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| fs_error(dir, "list directory", e))? {
        let entry = entry.map_err(|e| fs_error(dir, "list directory", e))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect())
}

/// Image files in `dir`, sorted by name
///
/// # Errors
///
/// Returns a file system error if the directory cannot be listed
pub fn list_tiles(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|path| path.is_file() && has_extension(path, SHEET_EXTENSION))
        .collect())
}

fn ingested_stems(dir: &Path) -> Result<BTreeSet<String>> {
    Ok(list_entries(dir)?
        .iter()
        .filter(|path| has_extension(path, INGESTED_MARKER_EXTENSION))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
        .map(str::to_string)
        .collect())
}

fn find_character_dir(root: &Path, id: CharacterId) -> Result<Option<PathBuf>> {
    Ok(list_dirs(root)?.into_iter().find(|dir| {
        file_name(dir)
            .and_then(|name| parse_character_id(name).ok())
            .is_some_and(|dir_id| dir_id == id)
    }))
}
