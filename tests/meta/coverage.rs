//! Checks that `tests/unit` mirrors `src` one file per module

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    // Entry points and module declarations carry no logic of their own
    const EXEMPT_FILES: [&str; 3] = ["main.rs", "lib.rs", "mod.rs"];

    fn is_exempt(relative: &str) -> bool {
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        EXEMPT_FILES.contains(&file_name)
    }

    // Relative paths of every directory and `.rs` file below `base`
    fn rust_tree(base: &Path) -> io::Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let mut pending = vec![base.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                let relative = path
                    .strip_prefix(base)
                    .map_err(io::Error::other)?
                    .to_string_lossy()
                    .replace('\\', "/");

                if path.is_dir() {
                    found.insert(relative);
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "rs") {
                    found.insert(relative);
                }
            }
        }

        Ok(found)
    }

    fn report(title: &str, entries: &[String]) -> String {
        format!("{title}:\n  - {}", entries.join("\n  - "))
    }

    #[test]
    fn test_every_source_file_has_unit_tests() {
        let sources = rust_tree(Path::new("src")).expect("src directory is readable");
        let tests = rust_tree(Path::new("tests/unit")).unwrap_or_default();

        let missing: Vec<String> = sources
            .iter()
            .filter(|path| !is_exempt(path) && !tests.contains(*path))
            .map(|path| format!("src/{path} -> tests/unit/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "{}",
            report("Source files without unit tests", &missing)
        );
    }

    #[test]
    fn test_every_unit_test_has_a_source_file() {
        let sources = rust_tree(Path::new("src")).expect("src directory is readable");
        let tests = rust_tree(Path::new("tests/unit")).unwrap_or_default();

        let orphaned: Vec<String> = tests
            .iter()
            .filter(|path| !is_exempt(path) && !sources.contains(*path))
            .map(|path| format!("tests/unit/{path} has no src/{path}"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "{}",
            report("Unit tests without a source file", &orphaned)
        );
    }

    #[test]
    fn test_every_test_file_declares_tests() {
        let tests = rust_tree(Path::new("tests")).expect("tests directory is readable");

        let empty: Vec<String> = tests
            .iter()
            .filter(|path| path.ends_with(".rs") && !is_exempt(path))
            .filter(|path| {
                fs::read_to_string(Path::new("tests").join(path))
                    .is_ok_and(|content| !content.contains("#[test]"))
            })
            .map(|path| format!("tests/{path}"))
            .collect();

        assert!(
            empty.is_empty(),
            "{}",
            report("Test files without #[test] functions", &empty)
        );
    }
}
