//! Character identifiers parsed from sheet and asset file names

use std::fmt;
use std::path::Path;

use crate::io::error::{PipelineError, Result};

/// Character number embedded in a sheet's file name
///
/// Several sheets may share one identifier when a character has more than one
/// costume sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterId(u64);

impl CharacterId {
    /// Wrap a raw character number
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw character number
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse the first run of ASCII digits in `name` as a character number
///
/// `"sheet_042_home"` yields `42`; leading zeros are not significant.
///
/// # Errors
///
/// Returns `InvalidCharacterId` if `name` contains no digits or the digit run
/// does not fit in a `u64`
pub fn parse_character_id(name: &str) -> Result<CharacterId> {
    let invalid = || PipelineError::InvalidCharacterId {
        name: name.to_string(),
    };

    let start = name.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
    let rest = name.get(start..).ok_or_else(invalid)?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest.get(..end).ok_or_else(invalid)?;

    digits
        .parse::<u64>()
        .map(CharacterId)
        .map_err(|_overflow| invalid())
}

/// File stem of a sheet together with its parsed character number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SheetName {
    /// File name without extension; the canonical key of the sheet
    pub stem: String,
    /// Character number parsed from the stem
    pub id: CharacterId,
}

impl SheetName {
    /// Derive the canonical key and character number of a sheet path
    ///
    /// # Errors
    ///
    /// Returns `InvalidCharacterId` if the path has no UTF-8 file stem or the
    /// stem carries no character number
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PipelineError::InvalidCharacterId {
                name: path.display().to_string(),
            })?;
        Self::from_stem(stem)
    }

    /// Build from a bare file stem
    ///
    /// # Errors
    ///
    /// Returns `InvalidCharacterId` if the stem carries no character number
    pub fn from_stem(stem: &str) -> Result<Self> {
        Ok(Self {
            stem: stem.to_string(),
            id: parse_character_id(stem)?,
        })
    }
}

impl fmt::Display for SheetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem)
    }
}
