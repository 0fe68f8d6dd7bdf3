//! Incremental ingestion planning
//!
//! Compares the raw sheet directory with the asset store and decides which
//! sheets still need cutting. A character number with a stored base is
//! already claimed; otherwise sheets are visited in sorted file name order and
//! the first sheet seen for a number claims it. The plan is deterministic and
//! a re-run against a fully ingested store is empty.
//!
//! A sheet counts as ingested only once its `.ingested` marker exists, so a
//! base stored by a job that failed later is planned again.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::io::configuration::SHEET_EXTENSION;
use crate::io::error::{PipelineError, Result, fs_error};
use crate::sheet::identity::{CharacterId, SheetName};
use crate::store::{AssetStore, StoreInventory};

/// One sheet to cut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Raw sheet path
    pub path: PathBuf,
    /// Canonical key and character number of the sheet
    pub sheet: SheetName,
    /// The sheet provides the character's base tile
    pub is_new_character: bool,
    /// Directory receiving the sheet's variant tiles
    pub variant_dir: PathBuf,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_new_character {
            "new"
        } else {
            "alternate"
        };
        write!(f, "{} ({kind})", self.sheet)
    }
}

/// Worklists produced by a planning pass
#[derive(Debug, Default)]
pub struct IngestionPlan {
    /// Sheets introducing a character, dispatched first
    pub new_characters: Vec<Job>,
    /// Further costume sheets of known or newly claimed characters
    pub alternates: Vec<Job>,
    /// Sheets that could not be planned, with the reason
    pub skipped: Vec<(PathBuf, PipelineError)>,
}

impl IngestionPlan {
    /// True when nothing needs ingesting
    pub const fn is_empty(&self) -> bool {
        self.new_characters.is_empty() && self.alternates.is_empty()
    }
}

/// Builds ingestion worklists from raw sheets and store state
#[derive(Debug, Clone)]
pub struct IngestionPlanner {
    store: AssetStore,
}

impl IngestionPlanner {
    /// Create a planner targeting `store`
    pub const fn new(store: AssetStore) -> Self {
        Self { store }
    }

    /// List raw sheet files under `raw_root`, sorted by file name
    ///
    /// # Errors
    ///
    /// Returns `MissingDirectory` if `raw_root` does not exist, or a file
    /// system error if it cannot be listed
    pub fn scan_raw_sheets(raw_root: &Path) -> Result<Vec<PathBuf>> {
        if !raw_root.is_dir() {
            return Err(PipelineError::MissingDirectory {
                path: raw_root.to_path_buf(),
            });
        }

        let mut sheets = Vec::new();
        for entry in std::fs::read_dir(raw_root).map_err(|e| fs_error(raw_root, "list directory", e))? {
            let path = entry
                .map_err(|e| fs_error(raw_root, "list directory", e))?
                .path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(SHEET_EXTENSION) {
                sheets.push(path);
            }
        }
        sheets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(sheets)
    }

    /// Split `raw_sheets` into new-character and alternate jobs
    ///
    /// `raw_sheets` is sorted here; callers need not pre-sort.
    pub fn plan(&self, raw_sheets: &[PathBuf], inventory: &StoreInventory) -> IngestionPlan {
        let mut plan = IngestionPlan::default();
        let named = name_sheets(raw_sheets, &mut plan.skipped);

        let mut claimed: HashMap<CharacterId, SheetName> = inventory
            .base_sheets()
            .map(|base| (base.id, base.clone()))
            .collect();

        for (path, sheet) in &named {
            if inventory.is_known_base(&sheet.stem) {
                let variant_dir = self.store.variant_dir_for(sheet);
                if inventory.has_ingested(&variant_dir, &sheet.stem) {
                    debug!("{sheet}: already ingested as base of {}", sheet.id);
                } else {
                    warn!("{sheet}: base stored without completion marker, ingesting again");
                    plan.new_characters.push(Job {
                        path: path.clone(),
                        sheet: sheet.clone(),
                        is_new_character: true,
                        variant_dir,
                    });
                }
            } else if !claimed.contains_key(&sheet.id) && !inventory.is_known_variant(&sheet.stem) {
                debug!("{sheet}: new character {}", sheet.id);
                claimed.insert(sheet.id, sheet.clone());
                plan.new_characters.push(Job {
                    path: path.clone(),
                    sheet: sheet.clone(),
                    is_new_character: true,
                    variant_dir: self.store.variant_dir_for(sheet),
                });
            } else {
                let variant_dir = inventory.variant_dir(sheet.id).map_or_else(
                    || self.expected_variant_dir(sheet, &claimed, &named),
                    Path::to_path_buf,
                );

                if inventory.has_ingested(&variant_dir, &sheet.stem) {
                    debug!("{sheet}: alternate already ingested");
                } else {
                    debug!("{sheet}: alternate costume for {}", sheet.id);
                    plan.alternates.push(Job {
                        path: path.clone(),
                        sheet: sheet.clone(),
                        is_new_character: false,
                        variant_dir,
                    });
                }
            }
        }

        plan
    }

    // Before the first variant of a character is stored its directory is named
    // after the sheet that claimed it, or the first raw sheet with its number.
    fn expected_variant_dir(
        &self,
        sheet: &SheetName,
        claimed: &HashMap<CharacterId, SheetName>,
        named: &[(PathBuf, SheetName)],
    ) -> PathBuf {
        let canonical = claimed
            .get(&sheet.id)
            .or_else(|| {
                named
                    .iter()
                    .map(|(_, candidate)| candidate)
                    .find(|candidate| candidate.id == sheet.id)
            })
            .unwrap_or(sheet);
        self.store.variant_dir_for(canonical)
    }
}

/// Parse every sheet name, sorted by file name; unparseable paths go to `skipped`
fn name_sheets(
    raw_sheets: &[PathBuf],
    skipped: &mut Vec<(PathBuf, PipelineError)>,
) -> Vec<(PathBuf, SheetName)> {
    let mut named = Vec::with_capacity(raw_sheets.len());
    for path in raw_sheets {
        match SheetName::from_path(path) {
            Ok(sheet) => named.push((path.clone(), sheet)),
            Err(error) => {
                warn!("Skipping {}: {error}", path.display());
                skipped.push((path.clone(), error));
            }
        }
    }
    named.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));
    named
}
