//! Resolving user selections into stored tile files
//!
//! A selection is an ordered list of (character, base-or-variant) slots. Each
//! slot resolves to exactly one stored file; when a character has several
//! variants a [`Disambiguator`] picks one, and an undecided slot is handed
//! back to the caller as `AmbiguousSelection` so it can be asked again.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::io::configuration::{Config, MAX_SELECTION_REPLAYS};
use crate::io::error::{PipelineError, Result};
use crate::sheet::identity::CharacterId;
use crate::store::AssetStore;

/// Which stored tile of a character is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantSelector {
    /// The canonical tile
    Base,
    /// One of the alternate tiles
    Variant,
}

impl VariantSelector {
    /// Letter used in composed names: `N` for base, `C` for variant
    pub const fn token(self) -> char {
        match self {
            Self::Base => 'N',
            Self::Variant => 'C',
        }
    }
}

impl fmt::Display for VariantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Variant => write!(f, "variant"),
        }
    }
}

/// One requested tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSlot {
    /// Requested character
    pub id: CharacterId,
    /// Requested kind of tile
    pub selector: VariantSelector,
}

impl fmt::Display for SelectionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}_{})", self.id, self.selector.token())
    }
}

/// Ordered list of requested tiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    slots: Vec<SelectionSlot>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the same kind of tile for every id, in order
    pub fn from_ids(ids: &[CharacterId], selector: VariantSelector) -> Self {
        let mut selection = Self::new();
        selection.extend(ids, selector);
        selection
    }

    /// Append one slot
    pub fn push(&mut self, id: CharacterId, selector: VariantSelector) {
        self.slots.push(SelectionSlot { id, selector });
    }

    /// Append one slot per id
    pub fn extend(&mut self, ids: &[CharacterId], selector: VariantSelector) {
        for &id in ids {
            self.push(id, selector);
        }
    }

    /// Requested slots in order
    pub fn slots(&self) -> &[SelectionSlot] {
        &self.slots
    }

    /// Number of slots
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing is selected
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Descriptive collage name, e.g. `(12_N)&(40_C)`
    pub fn name(&self) -> String {
        self.slots
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Resolved tiles ready for composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionRequest {
    /// Stored tile files in selection order
    pub tiles: Vec<PathBuf>,
    /// Descriptive name derived from the selection
    pub name: String,
}

/// Picks one file when a character has several stored variants
pub trait Disambiguator {
    /// Choose one of `candidates`, or `None` to leave the slot undecided
    fn choose(&mut self, id: CharacterId, candidates: &[PathBuf]) -> Option<PathBuf>;
}

/// Always takes the first candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl Disambiguator for FirstCandidate {
    fn choose(&mut self, _id: CharacterId, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates.first().cloned()
    }
}

/// Asks a Y/N question per candidate until one is accepted
pub struct PromptDisambiguator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptDisambiguator<R, W> {
    /// Prompt on `output` and read answers from `input`
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    // Some(true) for yes, Some(false) for no, None once input is exhausted
    fn ask(&mut self, candidate: &Path) -> Option<bool> {
        let name = candidate
            .file_name()
            .map_or_else(|| candidate.display().to_string(), |n| n.to_string_lossy().into_owned());

        loop {
            write!(self.output, "Is this the right file? \"{name}\"  Y/N: ").ok()?;
            self.output.flush().ok()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer).ok()? == 0 {
                return None;
            }
            match answer.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
                Some('y') => return Some(true),
                Some('n') => return Some(false),
                _ => warn!("Invalid input. Please enter Y or N."),
            }
        }
    }
}

impl<R: BufRead, W: Write> Disambiguator for PromptDisambiguator<R, W> {
    fn choose(&mut self, id: CharacterId, candidates: &[PathBuf]) -> Option<PathBuf> {
        for candidate in candidates {
            match self.ask(candidate) {
                Some(true) => return Some(candidate.clone()),
                Some(false) => {}
                None => return None,
            }
        }
        warn!("Last stored variant of character {id} reached without a choice");
        None
    }
}

/// Resolves selections against the asset store
#[derive(Debug, Clone)]
pub struct SelectionResolver {
    store: AssetStore,
    max_replays: usize,
}

impl SelectionResolver {
    /// Create a resolver over `store`
    pub const fn new(store: AssetStore) -> Self {
        Self {
            store,
            max_replays: MAX_SELECTION_REPLAYS,
        }
    }

    /// Create a resolver from pipeline configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(AssetStore::from_config(config))
    }

    /// Change how often an undecided slot is asked again
    #[must_use]
    pub const fn with_max_replays(mut self, max_replays: usize) -> Self {
        self.max_replays = max_replays;
        self
    }

    /// Resolve one slot to a stored file
    ///
    /// # Errors
    ///
    /// Returns `UnresolvableSelection` if nothing is stored for the slot and
    /// `AmbiguousSelection` if several variants exist and none was chosen
    pub fn resolve_slot(
        &self,
        slot: SelectionSlot,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<PathBuf> {
        let unresolvable = || PipelineError::UnresolvableSelection {
            id: slot.id,
            selector: slot.selector,
        };

        match slot.selector {
            VariantSelector::Base => self.store.base_tile(slot.id)?.ok_or_else(unresolvable),
            VariantSelector::Variant => {
                let mut candidates = self.store.variant_tiles(slot.id)?;
                match candidates.len() {
                    0 => Err(unresolvable()),
                    1 => Ok(candidates.remove(0)),
                    _ => disambiguator
                        .choose(slot.id, &candidates)
                        .ok_or(PipelineError::AmbiguousSelection {
                            id: slot.id,
                            candidates,
                        }),
                }
            }
        }
    }

    /// Resolve every slot in order, replaying undecided slots
    ///
    /// # Errors
    ///
    /// Returns `UnresolvableSelection` as soon as a slot has no stored tile,
    /// or `AmbiguousSelection` once a slot stays undecided after every replay
    pub fn resolve(
        &self,
        selection: &Selection,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<CompositionRequest> {
        let mut tiles = Vec::with_capacity(selection.len());

        for &slot in selection.slots() {
            let mut attempt = 0;
            let tile = loop {
                match self.resolve_slot(slot, disambiguator) {
                    Err(e @ PipelineError::AmbiguousSelection { .. }) => {
                        if attempt >= self.max_replays {
                            return Err(e);
                        }
                        attempt += 1;
                        warn!("No file chosen for {slot}. Returning the entry to the queue.");
                    }
                    other => break other?,
                }
            };
            tiles.push(tile);
        }

        Ok(CompositionRequest {
            tiles,
            name: selection.name(),
        })
    }
}

/// Parse a comma-separated list of character numbers, e.g. `"3, 12,40"`
///
/// # Errors
///
/// Returns `InvalidCharacterId` for any entry that is not a plain number
pub fn parse_id_list(list: &str) -> Result<Vec<CharacterId>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<u64>()
                .map(CharacterId::new)
                .map_err(|_parse_error| PipelineError::InvalidCharacterId {
                    name: entry.to_string(),
                })
        })
        .collect()
}
