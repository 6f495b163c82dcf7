//! Directory walking implementation using walkdir.

use super::{is_hidden, WalkEntry};
use crate::error::{ArchiveError, Result, ScanWarning};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory walker
#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl WalkConfig {
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }
}

/// Walker over a directory tree
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    config: WalkConfig,
}

impl DirectoryWalker {
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Start a lazy walk over everything below `root`.
    ///
    /// Each call starts from scratch; a [`Walk`] cannot be resumed.
    ///
    /// # Errors
    /// `NotFound` when `root` is missing, `Io` when it is not a directory.
    pub fn walk(&self, root: &Path) -> Result<Walk> {
        let stat = root
            .metadata()
            .map_err(|e| ArchiveError::from_io(root, e))?;
        if !stat.is_dir() {
            return Err(ArchiveError::Io {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .min_depth(1);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        // The root is also offered to the predicate; it is never hidden
        let include_hidden = self.config.include_hidden;
        let entries = walker.into_iter().filter_entry(move |entry| {
            include_hidden || entry.depth() == 0 || !is_hidden(entry.file_name())
        });

        Ok(Walk {
            root: root.to_path_buf(),
            inner: Box::new(entries),
        })
    }

    /// Like [`walk`](Self::walk) but only yields files
    pub fn files(
        &self,
        root: &Path,
    ) -> Result<impl Iterator<Item = std::result::Result<WalkEntry, ScanWarning>>> {
        Ok(self
            .walk(root)?
            .filter(|entry| entry.as_ref().map_or(true, |e| e.is_file)))
    }
}

/// A lazy walk in progress.
///
/// Yields `Err(ScanWarning)` for entries that could not be read (permission
/// problems, entries removed mid-walk) and keeps going.
pub struct Walk {
    root: PathBuf,
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>,
}

impl Walk {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Walk {
    type Item = std::result::Result<WalkEntry, ScanWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(match item {
            Ok(entry) => to_walk_entry(&entry),
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                Err(ScanWarning::new(&path, e.to_string()))
            }
        })
    }
}

fn to_walk_entry(entry: &DirEntry) -> std::result::Result<WalkEntry, ScanWarning> {
    let is_file = entry.file_type().is_file();
    let size_bytes = if is_file {
        entry
            .metadata()
            .map_err(|e| ScanWarning::new(entry.path(), e.to_string()))?
            .len()
    } else {
        0
    };

    Ok(WalkEntry {
        path: entry.path().to_path_buf(),
        is_file,
        size_bytes,
    })
}
