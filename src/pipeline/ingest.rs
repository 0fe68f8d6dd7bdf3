//! Ingestion run: plan, then cut new characters, then cut alternates

use std::path::PathBuf;

use log::{info, warn};

use crate::io::configuration::Config;
use crate::io::error::Result;
use crate::io::progress::ProgressManager;
use crate::pipeline::dispatcher::{DispatchReport, JobDispatcher};
use crate::pipeline::planner::{IngestionPlanner, Job};
use crate::sheet::classifier::{SourceSheet, TileClassifier};
use crate::sheet::entry_tag::{EntryTag, EntryTagExtractor};
use crate::sheet::identity::SheetName;
use crate::store::AssetStore;

/// What one job wrote into the store
#[derive(Debug, Clone)]
pub struct SheetOutcome {
    /// The ingested sheet
    pub sheet: SheetName,
    /// Stored base tile, for new characters
    pub base: Option<PathBuf>,
    /// Stored variant tiles
    pub variants: Vec<PathBuf>,
    /// Entry tag request result, for new characters
    pub entry_tag: Option<EntryTag>,
}

/// Results of both dispatch batches of an ingestion run
#[derive(Debug)]
pub struct IngestSummary {
    /// One slot per new-character job
    pub new_characters: DispatchReport<SheetOutcome>,
    /// One slot per alternate job
    pub alternates: DispatchReport<SheetOutcome>,
    /// Raw sheets the planner could not use
    pub skipped: usize,
}

impl IngestSummary {
    fn empty() -> Self {
        Self {
            new_characters: DispatchReport {
                results: Vec::new(),
            },
            alternates: DispatchReport {
                results: Vec::new(),
            },
            skipped: 0,
        }
    }

    /// Number of failed jobs across both batches
    pub fn failure_count(&self) -> usize {
        self.new_characters.failures().count() + self.alternates.failures().count()
    }
}

/// Drives an incremental ingestion of the raw sheet directory
#[derive(Debug, Clone)]
pub struct Ingestor {
    config: Config,
    store: AssetStore,
    classifier: TileClassifier,
    tags: EntryTagExtractor,
    dispatcher: JobDispatcher,
}

impl Ingestor {
    /// Build every component from `config`
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: AssetStore::from_config(config),
            classifier: TileClassifier::from_config(config),
            tags: EntryTagExtractor::from_config(config),
            dispatcher: JobDispatcher::new(config.max_workers),
        }
    }

    /// The store this ingestor writes into
    pub const fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Ingest every raw sheet the store does not hold yet
    ///
    /// New characters are cut before alternates so an alternate's variant
    /// directory always exists by the time it is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the raw root is missing or the store cannot be
    /// read. Per-sheet failures are reported in the summary instead.
    pub fn run(&self, progress: Option<&ProgressManager>) -> Result<IngestSummary> {
        let raw_sheets = IngestionPlanner::scan_raw_sheets(&self.config.raw_root)?;
        if raw_sheets.is_empty() {
            warn!(
                "No images detected in {}",
                self.config.raw_root.display()
            );
            return Ok(IngestSummary::empty());
        }

        let inventory = self.store.inventory()?;
        let plan = IngestionPlanner::new(self.store.clone()).plan(&raw_sheets, &inventory);
        info!(
            "{} new characters, {} alternate sheets to ingest",
            plan.new_characters.len(),
            plan.alternates.len()
        );

        let new_bar = progress
            .filter(|_| !plan.new_characters.is_empty())
            .map(|pm| pm.start_batch("New characters", plan.new_characters.len()));
        let new_characters =
            self.dispatcher
                .run(&plan.new_characters, |job| self.process(job), new_bar.as_ref());

        let alternate_bar = progress
            .filter(|_| !plan.alternates.is_empty())
            .map(|pm| pm.start_batch("Alternates", plan.alternates.len()));
        let alternates =
            self.dispatcher
                .run(&plan.alternates, |job| self.process(job), alternate_bar.as_ref());

        let summary = IngestSummary {
            new_characters,
            alternates,
            skipped: plan.skipped.len(),
        };
        if summary.failure_count() > 0 {
            warn!("{} sheets failed to ingest", summary.failure_count());
        }
        Ok(summary)
    }

    /// Cut one sheet and write its tiles into the store
    ///
    /// # Errors
    ///
    /// Returns `MalformedSheet` for sheets of the wrong size, or any decoding
    /// or writing error. Nothing is written for a malformed sheet.
    pub fn process(&self, job: &Job) -> Result<SheetOutcome> {
        let sheet = SourceSheet::load(&job.path, self.config.tile_width, self.config.tile_height)?;
        let classification = self.classifier.classify(&sheet, job.is_new_character)?;

        let mut base = None;
        let mut entry_tag = None;
        if let Some(tile) = classification.base.as_ref() {
            base = Some(self.store.put_base(&job.sheet, tile)?);
            entry_tag = Some(self.tags.extract(tile, job.sheet.id)?);
        }

        let variants = self
            .store
            .put_variants(&job.variant_dir, &job.sheet, &classification.variants)?;

        Ok(SheetOutcome {
            sheet: job.sheet.clone(),
            base,
            variants,
            entry_tag,
        })
    }
}
