//! Filesystem utilities for writing generated sources.

use std::fs;
use std::path::Path;

use crate::error::GeneratorError;

/// Write a generated source file, creating parent directories if needed.
///
/// Failures carry the target path so the orchestrator can report them
/// per-file and keep going.
pub fn write_source<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), GeneratorError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::Io {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    fs::write(path, contents).map_err(|e| GeneratorError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_source_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.py");

        write_source(&path, "class Users:\n    pass\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "class Users:\n    pass\n"
        );
    }

    #[test]
    fn test_write_source_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten with a file.
        let err = write_source(dir.path(), "contents").unwrap_err();
        assert!(matches!(err, GeneratorError::Io { .. }));
    }
}
