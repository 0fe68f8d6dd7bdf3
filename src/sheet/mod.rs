//! Raw sheet handling
//!
//! This module contains sheet-related functionality including:
//! - Character number parsing from file names
//! - Tile segmentation and base/variant classification
//! - Entry tag extraction from base tiles

/// Sheet validation and tile classification
pub mod classifier;
/// Entry tag cropping with per-character memoization
pub mod entry_tag;
/// Character number parsing
pub mod identity;

pub use classifier::{Classification, ScanPolicy, SourceSheet, TileClassifier};
pub use identity::{CharacterId, SheetName, parse_character_id};
