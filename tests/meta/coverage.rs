//! Layout checks: src modules mirror unit test files and every test file is wired in

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SRC: &str = "src";
    const UNIT: &str = "tests/unit";

    // Relative paths of every `.rs` file and directory below `root`
    fn rust_tree(root: &Path) -> io::Result<BTreeSet<PathBuf>> {
        let mut found = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                let relative = path
                    .strip_prefix(root)
                    .map_err(|_outside_root| io::Error::other("entry outside scanned root"))?
                    .to_path_buf();

                if path.is_dir() {
                    pending.push(path);
                    found.insert(relative);
                } else if path.extension().is_some_and(|ext| ext == "rs") {
                    found.insert(relative);
                }
            }
        }

        Ok(found)
    }

    // Entry points and module declarations carry no tests of their own
    fn is_wiring(path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name == "main.rs" || name == "lib.rs" || name == "mod.rs")
    }

    fn listing(paths: &[&PathBuf], from: &str, to: &str) -> String {
        paths
            .iter()
            .map(|path| format!("  - {from}/{0} -> {to}/{0}", path.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Tests each src module has a unit test file at the mirrored path
    // Verified by deleting tests/unit/store/assets.rs
    #[test]
    fn test_src_modules_have_unit_tests() {
        let src = rust_tree(Path::new(SRC)).unwrap();
        let unit = rust_tree(Path::new(UNIT)).unwrap();

        let missing: Vec<&PathBuf> = src
            .iter()
            .filter(|path| !is_wiring(path) && !unit.contains(*path))
            .collect();

        assert!(
            missing.is_empty(),
            "src modules without unit tests:\n{}",
            listing(&missing, SRC, UNIT)
        );
    }

    // Tests no unit test file outlives the module it covers
    // Verified by adding tests/unit/sheet/palette.rs
    #[test]
    fn test_unit_tests_mirror_src() {
        let src = rust_tree(Path::new(SRC)).unwrap();
        let unit = rust_tree(Path::new(UNIT)).unwrap();

        let orphaned: Vec<&PathBuf> = unit
            .iter()
            .filter(|path| !is_wiring(path) && !src.contains(*path))
            .collect();

        assert!(
            orphaned.is_empty(),
            "unit tests without a src module:\n{}",
            listing(&orphaned, UNIT, SRC)
        );
    }

    // Tests every unit test file and group is declared by its parent module
    // Verified by removing `mod planner;` from tests/unit/pipeline/mod.rs
    #[test]
    fn test_unit_files_are_declared() {
        let root = Path::new(UNIT);
        let unit = rust_tree(root).unwrap();
        let mut undeclared = Vec::new();

        for path in unit.iter().filter(|path| !is_wiring(path)) {
            let parent = path.parent().unwrap_or(Path::new(""));
            let declaring = if parent.as_os_str().is_empty() {
                root.join("main.rs")
            } else {
                root.join(parent).join("mod.rs")
            };
            let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap();
            let declarations = fs::read_to_string(&declaring).unwrap_or_default();

            if !declarations.contains(&format!("mod {stem};")) {
                undeclared.push(format!("  - {} in {}", path.display(), declaring.display()));
            }
        }

        assert!(
            undeclared.is_empty(),
            "unit test files the harness never compiles:\n{}",
            undeclared.join("\n")
        );
    }

    // Tests every file under tests/ that is not wiring defines a test
    // Verified by stripping the #[test] attributes from tests/pipeline.rs
    #[test]
    fn test_test_files_contain_tests() {
        let root = Path::new("tests");
        let empty: Vec<String> = rust_tree(root)
            .unwrap()
            .into_iter()
            .map(|path| root.join(path))
            .filter(|path| path.is_file() && !is_wiring(path))
            .filter(|path| !fs::read_to_string(path).unwrap().contains("#[test]"))
            .map(|path| format!("  - {}", path.display()))
            .collect();

        assert!(
            empty.is_empty(),
            "test files without any #[test]:\n{}",
            empty.join("\n")
        );
    }

    // Tests each bench source has a matching [[bench]] target in Cargo.toml
    // Verified by adding benches/ingest.rs without a target
    #[test]
    fn test_benches_are_registered() {
        let manifest = fs::read_to_string("Cargo.toml").unwrap();
        let unregistered: Vec<String> = fs::read_dir("benches")
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|stem| !manifest.contains(&format!("name = \"{stem}\"")))
            .collect();

        assert!(
            unregistered.is_empty(),
            "bench files without a [[bench]] target: {unregistered:?}"
        );
    }
}
