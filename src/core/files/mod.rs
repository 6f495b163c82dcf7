//! Single-file utilities: tag a file with a unique id, list a folder by extension.

use crate::error::{ArchiveError, Result};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static UNSAFE_CHARS: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]"));

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_name(name: &str) -> Result<String> {
    let pattern = UNSAFE_CHARS
        .as_ref()
        .map_err(|e| ArchiveError::Config(e.to_string()))?;
    Ok(pattern.replace_all(name, "_").into_owned())
}

/// Rename `dir/name.ext` to `dir/<sanitized name>_<id>.ext` and return the new path.
///
/// The id is sanitized too, so it can never introduce a path separator.
///
/// # Errors
/// `NotFound` if `path` is absent. `Io` (`AlreadyExists`) if the target is
/// already taken; the existing file is never overwritten.
pub fn rename_with_id(path: &Path, id: &str) -> Result<PathBuf> {
    let metadata = fs::metadata(path).map_err(|e| ArchiveError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(ArchiveError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_name = match path.extension() {
        Some(ext) => format!(
            "{}_{}.{}",
            sanitize_name(&stem)?,
            sanitize_name(id)?,
            ext.to_string_lossy()
        ),
        None => format!("{}_{}", sanitize_name(&stem)?, sanitize_name(id)?),
    };
    let target = path.with_file_name(new_name);

    if target.exists() {
        return Err(ArchiveError::Io {
            path: target,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
        });
    }

    fs::rename(path, &target).map_err(|e| ArchiveError::from_io(path, e))?;
    debug!(from = %path.display(), to = %target.display(), "renamed with id");
    Ok(target)
}

/// Entries directly inside `dir` whose names end with `extension`, ignoring case.
///
/// Not recursive. Sorted by file name.
pub fn list_files_by_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = extension.to_lowercase();
    let entries = fs::read_dir(dir).map_err(|e| ArchiveError::from_io(dir, e))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ArchiveError::from_io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.ends_with(&suffix) {
            matches.push(entry.path());
        }
    }

    matches.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_name("my report (v2)").unwrap(), "my_report__v2_");
        assert_eq!(sanitize_name("ok-name_1.txt").unwrap(), "ok-name_1.txt");
        assert_eq!(sanitize_name("a/b").unwrap(), "a_b");
    }

    #[test]
    fn sanitize_is_stable_across_calls() {
        let first = sanitize_name("a b").unwrap();
        let second = sanitize_name("a b").unwrap();
        assert_eq!(first, "a_b");
        assert_eq!(first, second);
        assert!(UNSAFE_CHARS.is_ok());
    }

    #[test]
    fn rename_inserts_id_before_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("my report.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let renamed = rename_with_id(&path, "abc123").unwrap();

        assert_eq!(renamed, temp_dir.path().join("my_report_abc123.pdf"));
        assert!(!path.exists());
        assert_eq!(fs::read(&renamed).unwrap(), b"%PDF");
    }

    #[test]
    fn rename_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("README");
        fs::write(&path, b"readme").unwrap();

        let renamed = rename_with_id(&path, "7").unwrap();
        assert_eq!(renamed, temp_dir.path().join("README_7"));
    }

    #[test]
    fn rename_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        let taken = temp_dir.path().join("notes_1.txt");
        fs::write(&path, b"new").unwrap();
        fs::write(&taken, b"old").unwrap();

        let result = rename_with_id(&path, "1");

        assert!(matches!(result, Err(ArchiveError::Io { .. })));
        assert_eq!(fs::read(&taken).unwrap(), b"old");
        assert!(path.exists());
    }

    #[test]
    fn rename_missing_file_is_not_found() {
        let result = rename_with_id(Path::new("/nonexistent/archive/a.txt"), "1");
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));
    }

    #[test]
    fn list_matches_extension_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.PDF"), b"").unwrap();
        fs::write(temp_dir.path().join("a.pdf"), b"").unwrap();
        fs::write(temp_dir.path().join("c.txt"), b"").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("d.pdf"), b"").unwrap();

        let files = list_files_by_extension(temp_dir.path(), ".pdf").unwrap();

        assert_eq!(
            files,
            vec![temp_dir.path().join("a.pdf"), temp_dir.path().join("b.PDF")]
        );
    }

    #[test]
    fn list_missing_dir_is_not_found() {
        let result = list_files_by_extension(Path::new("/nonexistent/archive"), ".pdf");
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));
    }
}
