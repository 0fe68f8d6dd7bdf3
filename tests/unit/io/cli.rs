//! Tests for command-line parsing and the ingest-then-compose processor

#[cfg(test)]
mod tests {
    use crate::{TILE_H, TILE_W, drawn_tile, test_config, write_sheet};
    use clap::Parser;
    use sheetmerge::PipelineError;
    use sheetmerge::io::cli::{Cli, Command, LineupArgs, SheetProcessor};
    use sheetmerge::io::codec::{OutputFormat, Quality, decode_raster};
    use sheetmerge::io::configuration::{DEFAULT_ROW_CAPACITY, MAX_WORKERS};
    use sheetmerge::io::selection::FirstCandidate;
    use sheetmerge::sheet::classifier::ScanPolicy;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // Tests CLI parsing with only the subcommand
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["sheetmerge", "ingest"]);

        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.row_capacity, DEFAULT_ROW_CAPACITY);
        assert_eq!(cli.workers, MAX_WORKERS);
        assert_eq!(cli.format, OutputFormat::Png);
        assert_eq!(cli.config().output_quality, Quality::Lossless);
        assert_eq!(cli.command, Command::Ingest);
        assert!(cli.should_show_progress());
    }

    // Tests global options flow into the configuration
    // Verified by ignoring the background flag
    #[test]
    fn test_cli_config() {
        let cli = Cli::parse_from([
            "sheetmerge",
            "--root",
            "/project",
            "--row-capacity",
            "4",
            "-j",
            "2",
            "--format",
            "webp",
            "--lossy",
            "90",
            "--continue-past-background",
            "-q",
            "ingest",
        ]);

        let config = cli.config();
        assert_eq!(config.raw_root, PathBuf::from("/project/Originals"));
        assert_eq!(config.row_capacity, 4);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.output_format, OutputFormat::Webp);
        assert_eq!(config.output_quality, Quality::Lossy(90));
        assert_eq!(config.scan_policy, ScanPolicy::SkipBackground);
        assert!(!cli.should_show_progress());
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    // Tests lossy quality is limited to 0..=100
    // Verified by accepting any u8 quality
    #[test]
    fn test_cli_lossy_range() {
        assert!(Cli::try_parse_from(["sheetmerge", "--lossy", "101", "ingest"]).is_err());
        let cli = Cli::parse_from(["sheetmerge", "--lossy", "0", "ingest"]);
        assert_eq!(cli.lossy, Some(0));
    }

    // Tests repeated selection lists and the merge flag
    // Verified by keeping only the last --base value
    #[test]
    fn test_cli_compose_args() {
        let cli = Cli::parse_from([
            "sheetmerge", "compose", "-n", "1,2", "--base", "5", "-c", "3", "--merged",
        ]);

        assert_eq!(
            cli.command,
            Command::Compose {
                base: vec!["1,2".to_string(), "5".to_string()],
                variant: vec!["3".to_string()],
                merged: true,
            }
        );
    }

    // Tests lineup requires exactly one of its flags
    // Verified by making the flag group optional
    #[test]
    fn test_cli_lineup_group() {
        let cli = Cli::parse_from(["sheetmerge", "lineup", "--variant"]);
        assert_eq!(
            cli.command,
            Command::Lineup(LineupArgs {
                base: false,
                variant: true,
            })
        );

        assert!(Cli::try_parse_from(["sheetmerge", "lineup"]).is_err());
        assert!(Cli::try_parse_from(["sheetmerge", "lineup", "--base", "--variant"]).is_err());
    }

    // Tests a missing raw sheet directory ends the run
    // Verified by creating the raw directory on demand
    #[test]
    fn test_process_missing_raw_root() {
        let dir = TempDir::new().unwrap();
        let processor = SheetProcessor::with_config(Command::Ingest, test_config(dir.path()));

        let result = processor.process_with(&mut FirstCandidate);

        assert!(matches!(result, Err(PipelineError::MissingDirectory { .. })));
    }

    // Tests compose ingests first, then writes one collage per selection kind
    // Verified by composing before ingestion
    #[test]
    fn test_process_compose() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.raw_root).unwrap();
        write_sheet(&config.raw_root, "1", &[drawn_tile(1), drawn_tile(2)]);
        write_sheet(&config.raw_root, "2", &[drawn_tile(3), drawn_tile(4)]);

        let command = Command::Compose {
            base: vec!["1,2".to_string()],
            variant: vec!["2".to_string()],
            merged: false,
        };
        let processor = SheetProcessor::with_config(command, config.clone());
        let artifacts = processor.process_with(&mut FirstCandidate).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(
            artifacts[0].path,
            config.output_root.join("(1_N)&(2_N).png")
        );
        assert_eq!(
            decode_raster(&artifacts[0].path).unwrap().dimensions(),
            (TILE_W * 2, TILE_H)
        );
        assert_eq!(artifacts[1].path, config.output_root.join("(2_C).png"));
    }

    // Tests merged compose writes a single collage
    // Verified by ignoring the merged flag
    #[test]
    fn test_process_compose_merged() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.raw_root).unwrap();
        write_sheet(&config.raw_root, "1", &[drawn_tile(1), drawn_tile(2)]);

        let command = Command::Compose {
            base: vec!["1".to_string()],
            variant: vec!["1".to_string()],
            merged: true,
        };
        let processor = SheetProcessor::with_config(command, config.clone());
        let artifacts = processor.process_with(&mut FirstCandidate).unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, config.output_root.join("(1_N)&(1_C).png"));
        let canvas = decode_raster(&artifacts[0].path).unwrap();
        assert_eq!(canvas.crop(0, 0, TILE_W, TILE_H).unwrap(), drawn_tile(1));
        assert_eq!(canvas.crop(TILE_W, 0, TILE_W, TILE_H).unwrap(), drawn_tile(2));
    }

    // Tests compose without any selection is rejected
    // Verified by writing an empty collage
    #[test]
    fn test_process_compose_empty_selection() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.raw_root).unwrap();

        let command = Command::Compose {
            base: Vec::new(),
            variant: vec![" , ".to_string()],
            merged: false,
        };
        let processor = SheetProcessor::with_config(command, config);
        let result = processor.process_with(&mut FirstCandidate);

        assert!(matches!(result, Err(PipelineError::InvalidParameter { .. })));
    }

    // Tests the base lineup composes every stored base
    // Verified by composing variants instead
    #[test]
    fn test_process_base_lineup() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.raw_root).unwrap();
        for name in ["1", "2", "3"] {
            write_sheet(&config.raw_root, name, &[drawn_tile(1)]);
        }

        let command = Command::Lineup(LineupArgs {
            base: true,
            variant: false,
        });
        let processor = SheetProcessor::with_config(command, config.clone());
        let artifacts = processor.process_with(&mut FirstCandidate).unwrap();

        assert_eq!(
            artifacts[0].path,
            config.output_root.join("(1_N)&(2_N)&(3_N).png")
        );
        assert_eq!(
            decode_raster(&artifacts[0].path).unwrap().dimensions(),
            (TILE_W * 3, TILE_H)
        );
    }
}
