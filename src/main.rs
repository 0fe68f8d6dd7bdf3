//! CLI entry point for sheet ingestion and collage composition

use clap::Parser;
use log::info;
use sheetmerge::io::cli::{Cli, SheetProcessor};
use sheetmerge::io::logging::init_logging;

fn main() -> sheetmerge::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level(), cli.log_file.as_deref())?;

    let processor = SheetProcessor::new(&cli);
    for artifact in processor.process()? {
        info!("File name {} saved!", artifact.path.display());
    }
    Ok(())
}
