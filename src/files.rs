//! Selection of Go source files to analyze.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::AnalysisError;

/// Go source file suffix.
pub const SOURCE_SUFFIX: &str = ".go";

/// Go test file suffix; these files are never selected from a directory.
pub const TEST_SUFFIX: &str = "_test.go";

/// Whether a file name is a non-test Go source file.
pub fn is_source_file(name: &str) -> bool {
    name.ends_with(SOURCE_SUFFIX) && !name.ends_with(TEST_SUFFIX)
}

/// Collect the files to analyze under `root`.
///
/// A file root is returned as-is. A directory is walked recursively in
/// file-name order, keeping files (or links to files) that pass
/// [`is_source_file`].
pub fn select_files(root: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    let metadata = std::fs::metadata(root).map_err(|e| AnalysisError::io(root, e))?;
    if !metadata.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            AnalysisError::io(path, source)
        })?;

        // Links are not followed by the walk, so ask the target.
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_source_file(&name) {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = files.len(), "selected source files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_single_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "x").unwrap();

        // A file root is taken as given, whatever its suffix.
        assert_eq!(select_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_directory_filters_and_orders() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("pkg/util")).unwrap();
        fs::write(root.join("main.go"), "package main").unwrap();
        fs::write(root.join("main_test.go"), "package main").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();
        fs::write(root.join("pkg/b.go"), "package pkg").unwrap();
        fs::write(root.join("pkg/a.go"), "package pkg").unwrap();
        fs::write(root.join("pkg/util/u.go"), "package util").unwrap();

        let files = select_files(root).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["main.go", "pkg/a.go", "pkg/b.go", "pkg/util/u.go"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_is_selected() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        fs::create_dir(&root).unwrap();
        let target = temp.path().join("shared.go");
        fs::write(&target, "package shared").unwrap();
        std::os::unix::fs::symlink(&target, root.join("linked.go")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.go"), root.join("dangling.go")).unwrap();

        assert_eq!(select_files(&root).unwrap(), vec![root.join("linked.go")]);
    }

    #[test]
    fn test_missing_root() {
        let err = select_files(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file("server.go"));
        assert!(!is_source_file("server_test.go"));
        assert!(!is_source_file("server.go.orig"));
    }
}
