//! Tests for error types including source chaining, path context and recoverability

#[cfg(test)]
mod tests {
    use sheetmerge::PipelineError;
    use sheetmerge::io::error::{WithPath, fs_error, invalid_parameter};
    use sheetmerge::io::selection::VariantSelector;
    use sheetmerge::sheet::identity::CharacterId;
    use std::error::Error;
    use std::path::{Path, PathBuf};

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = fs_error(Path::new("/tmp/12.png"), "read", io_error);

        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/12.png"));
        assert!(error.to_string().contains("read"));
    }

    // Tests malformed sheet message names the sheet and the expected grid
    // Verified by omitting the tile width from the message
    #[test]
    fn test_malformed_sheet_message() {
        let error = PipelineError::MalformedSheet {
            path: PathBuf::from("raw/7.png"),
            width: 1300,
            height: 1600,
            tile_width: 1200,
            tile_height: 1600,
        };

        let message = error.to_string();
        assert!(message.contains("raw/7.png"));
        assert!(message.contains("1300x1600"));
        assert!(message.contains("1200"));
        assert!(error.source().is_none());
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("row_capacity", &0, &"must be positive");

        let message = error.to_string();
        assert!(message.contains("row_capacity"));
        assert!(message.contains('0'));
        assert!(message.contains("must be positive"));
    }

    // Tests selection errors name the character and what was asked for
    // Verified by printing the candidate paths instead of the count
    #[test]
    fn test_selection_error_messages() {
        let ambiguous = PipelineError::AmbiguousSelection {
            id: CharacterId::new(4),
            candidates: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
        };
        assert!(ambiguous.to_string().contains("Character 4 has 2"));

        let missing = PipelineError::UnresolvableSelection {
            id: CharacterId::new(5),
            selector: VariantSelector::Variant,
        };
        assert!(missing.to_string().contains("Character 5"));
        assert!(missing.to_string().contains("variant"));
    }

    // Tests only per-item failures are recoverable
    // Verified by marking missing directories recoverable
    #[test]
    fn test_is_recoverable() {
        let worker = PipelineError::WorkerFailure {
            index: 2,
            job: "3 (new)".to_string(),
            reason: "boom".to_string(),
        };
        let missing = PipelineError::MissingDirectory {
            path: PathBuf::from("Originals"),
        };
        let unresolvable = PipelineError::UnresolvableSelection {
            id: CharacterId::new(1),
            selector: VariantSelector::Base,
        };

        assert!(worker.is_recoverable());
        assert!(!missing.is_recoverable());
        assert!(!unresolvable.is_recoverable());
    }

    // Tests placeholder paths are replaced for image errors
    // Verified by leaving the placeholder in place
    #[test]
    fn test_with_path_on_image_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let result: Result<(), image::ImageError> = Err(image_error);

        let error = result.with_path(Path::new("/out/1.png")).unwrap_err();

        let message = error.to_string();
        assert!(message.contains("/out/1.png"));
        assert!(!message.contains("<unknown>"));
        assert!(error.source().is_some());
    }
}
