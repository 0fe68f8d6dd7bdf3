//! Terminal and file logging setup for the binary

use std::fs::File;
use std::path::Path;

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::io::error::{Result, fs_error, invalid_parameter};

/// Log level chosen from the verbosity flags; `quiet` wins over `verbose`
pub const fn level_for(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the global logger: stderr, plus `log_file` when given
///
/// # Errors
///
/// Returns a file system error if the log file cannot be created and
/// `InvalidParameter` if a logger is already installed
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let config = ConfigBuilder::new()
        .add_filter_allow_str(env!("CARGO_CRATE_NAME"))
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| fs_error(path, "create log file", e))?;
        loggers.push(WriteLogger::new(level, config, file));
    }

    CombinedLogger::init(loggers).map_err(|e| invalid_parameter("logger", &"combined", &e))
}
