//! Command-line interface: ingest sheets, then compose selections or lineups

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use crate::composition::{CompositionEngine, CompositionMode, RowPerCharacterComposer, StoredArtifact};
use crate::io::codec::{OutputFormat, Quality};
use crate::io::configuration::{Config, DEFAULT_ROW_CAPACITY, MAX_WORKERS};
use crate::io::error::{Result, invalid_parameter};
use crate::io::logging::level_for;
use crate::io::progress::ProgressManager;
use crate::io::selection::{
    Disambiguator, PromptDisambiguator, Selection, SelectionResolver, VariantSelector,
    parse_id_list,
};
use crate::pipeline::{IngestSummary, Ingestor};
use crate::sheet::classifier::ScanPolicy;
use crate::sheet::identity::CharacterId;
use crate::store::AssetStore;

#[derive(Parser)]
#[command(name = "sheetmerge")]
#[command(
    author,
    version,
    about = "Split character sheets into tiles and merge selections into collages"
)]
/// Command-line arguments for the sheet pipeline
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Project root holding the raw sheet, store and output directories
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Only log warnings and errors, hide progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Log planner decisions
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Tiles per row before wrapping
    #[arg(long, default_value_t = DEFAULT_ROW_CAPACITY)]
    pub row_capacity: usize,

    /// Maximum concurrent ingestion workers
    #[arg(short = 'j', long, default_value_t = MAX_WORKERS)]
    pub workers: usize,

    /// Encoding of composed collages
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Encode WebP collages lossily at this quality, 0 to 100
    #[arg(long, value_name = "QUALITY", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub lossy: Option<u8>,

    /// Skip background tiles instead of ending the sheet scan at the first one
    #[arg(long)]
    pub continue_past_background: bool,

    /// What to do after ingestion
    #[command(subcommand)]
    pub command: Command,
}

/// Work performed after the store is brought up to date
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Only ingest new sheets
    Ingest,

    /// Compose selected characters into collages
    Compose {
        /// Character numbers whose base tile is selected, e.g. `3,12`
        #[arg(short = 'n', long = "base", value_name = "IDS")]
        base: Vec<String>,

        /// Character numbers whose variant tile is selected
        #[arg(short = 'c', long = "variant", value_name = "IDS")]
        variant: Vec<String>,

        /// Put base and variant selections into one collage
        #[arg(short, long)]
        merged: bool,
    },

    /// Compose every stored character
    Lineup(LineupArgs),
}

/// Which lineup to build
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct LineupArgs {
    /// Every base tile in one grid
    #[arg(long)]
    pub base: bool,

    /// One row of variants per character
    #[arg(long)]
    pub variant: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log level implied by the verbosity flags
    pub const fn log_level(&self) -> log::LevelFilter {
        level_for(self.quiet, self.verbose)
    }

    /// Pipeline configuration for the project root and flags
    pub fn config(&self) -> Config {
        let mut config = Config::from_root(&self.root);
        config.row_capacity = self.row_capacity;
        config.max_workers = self.workers;
        config.output_format = self.format;
        config.output_quality = self.lossy.map_or(Quality::Lossless, Quality::Lossy);
        if self.continue_past_background {
            config.scan_policy = ScanPolicy::SkipBackground;
        }
        config
    }
}

/// Runs ingestion and the requested composition
pub struct SheetProcessor {
    command: Command,
    config: Config,
    progress_manager: Option<ProgressManager>,
}

impl SheetProcessor {
    /// Create a processor for the parsed arguments
    pub fn new(cli: &Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            command: cli.command.clone(),
            config: cli.config(),
            progress_manager,
        }
    }

    /// Create a processor with an explicit configuration and no progress display
    pub const fn with_config(command: Command, config: Config) -> Self {
        Self {
            command,
            config,
            progress_manager: None,
        }
    }

    /// Configuration in use
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Prepare directories, ingest, then run the subcommand
    ///
    /// Variant ambiguity is settled by prompting on stdin.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid configuration, a missing raw sheet
    /// directory, or a selection that cannot be resolved
    pub fn process(&self) -> Result<Vec<StoredArtifact>> {
        let mut prompt = PromptDisambiguator::new(std::io::stdin().lock(), std::io::stderr());
        self.process_with(&mut prompt)
    }

    /// Like [`SheetProcessor::process`] with a caller-supplied disambiguator
    ///
    /// # Errors
    ///
    /// See [`SheetProcessor::process`]
    pub fn process_with(
        &self,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<Vec<StoredArtifact>> {
        self.config.validate()?;
        self.config.prepare_directories()?;

        let summary = Ingestor::new(&self.config).run(self.progress_manager.as_ref())?;
        log_summary(&summary);

        let artifacts = match &self.command {
            Command::Ingest => Vec::new(),
            Command::Compose {
                base,
                variant,
                merged,
            } => self.compose(base, variant, *merged, disambiguator)?,
            Command::Lineup(lineup) => vec![self.lineup(*lineup, disambiguator)?],
        };

        if let Some(pm) = &self.progress_manager {
            pm.finish();
        }

        Ok(artifacts)
    }

    fn compose(
        &self,
        base: &[String],
        variant: &[String],
        merged: bool,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<Vec<StoredArtifact>> {
        let base_ids = parse_lists(base)?;
        let variant_ids = parse_lists(variant)?;
        if base_ids.is_empty() && variant_ids.is_empty() {
            return Err(invalid_parameter(
                "selection",
                &"",
                &"pass --base or --variant with at least one character number",
            ));
        }

        let resolver = SelectionResolver::from_config(&self.config);
        let engine = CompositionEngine::from_config(&self.config);

        let mut requests = Vec::new();
        if merged {
            let mut selection = Selection::from_ids(&base_ids, VariantSelector::Base);
            selection.extend(&variant_ids, VariantSelector::Variant);
            requests.push((selection, CompositionMode::Merged));
        } else {
            requests.push((
                Selection::from_ids(&base_ids, VariantSelector::Base),
                CompositionMode::Base,
            ));
            requests.push((
                Selection::from_ids(&variant_ids, VariantSelector::Variant),
                CompositionMode::Variant,
            ));
        }

        let mut artifacts = Vec::new();
        for (selection, mode) in requests {
            if selection.is_empty() {
                continue;
            }
            let request = resolver.resolve(&selection, disambiguator)?;
            artifacts.push(engine.compose_files(&request.tiles, &request.name, mode)?);
        }
        Ok(artifacts)
    }

    fn lineup(
        &self,
        lineup: LineupArgs,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<StoredArtifact> {
        if lineup.variant {
            return RowPerCharacterComposer::from_config(&self.config).compose();
        }

        let ids: Vec<CharacterId> = AssetStore::from_config(&self.config)
            .all_bases()?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let selection = Selection::from_ids(&ids, VariantSelector::Base);
        let request =
            SelectionResolver::from_config(&self.config).resolve(&selection, disambiguator)?;
        CompositionEngine::from_config(&self.config).compose_files(
            &request.tiles,
            &request.name,
            CompositionMode::Base,
        )
    }
}

fn parse_lists(lists: &[String]) -> Result<Vec<CharacterId>> {
    let mut ids = Vec::new();
    for list in lists {
        ids.extend(parse_id_list(list)?);
    }
    Ok(ids)
}

fn log_summary(summary: &IngestSummary) {
    info!(
        "Ingested {} new characters and {} alternate sheets",
        summary.new_characters.success_count(),
        summary.alternates.success_count()
    );
    if summary.skipped > 0 {
        warn!("{} raw sheets have no character number", summary.skipped);
    }
}
