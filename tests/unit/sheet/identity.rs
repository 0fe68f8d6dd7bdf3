//! Tests for character number parsing from file names

#[cfg(test)]
mod tests {
    use sheetmerge::PipelineError;
    use sheetmerge::sheet::identity::{CharacterId, SheetName, parse_character_id};
    use std::path::Path;

    // Tests the first digit run is used
    // Verified by taking the last digit run
    #[test]
    fn test_first_digit_run() {
        assert_eq!(parse_character_id("12_alt3").unwrap(), CharacterId::new(12));
        assert_eq!(
            parse_character_id("sheet_042_home").unwrap(),
            CharacterId::new(42)
        );
        assert_eq!(parse_character_id("7").unwrap().value(), 7);
    }

    // Tests names without digits are rejected
    // Verified by defaulting to zero
    #[test]
    fn test_no_digits() {
        let err = parse_character_id("portrait").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCharacterId { name } if name == "portrait"));
    }

    // Tests digit runs too large for the identifier
    // Verified by saturating instead of failing
    #[test]
    fn test_overflowing_digits() {
        let result = parse_character_id("99999999999999999999999");
        assert!(matches!(result, Err(PipelineError::InvalidCharacterId { .. })));
    }

    // Tests sheet names keep the stem as the canonical key
    // Verified by keeping the extension in the stem
    #[test]
    fn test_sheet_name_from_path() {
        let name = SheetName::from_path(Path::new("/raw/0031_beach.png")).unwrap();

        assert_eq!(name.stem, "0031_beach");
        assert_eq!(name.id, CharacterId::new(31));
        assert_eq!(name.to_string(), "0031_beach");
    }

    // Tests sheet names without a character number
    // Verified by accepting any stem
    #[test]
    fn test_sheet_name_requires_number() {
        assert!(SheetName::from_path(Path::new("/raw/cover.png")).is_err());
        assert!(SheetName::from_stem("cover").is_err());
    }

    // Tests identifiers order numerically
    // Verified by comparing as strings
    #[test]
    fn test_identifier_ordering() {
        assert!(CharacterId::new(9) < CharacterId::new(10));
        assert_eq!(CharacterId::new(10).to_string(), "10");
    }
}
