//! # Duplicates Module
//!
//! Finds files with identical content by comparing digests.
//!
//! ## Policy
//! - Every non-hidden file is hashed in walk order (sha256 by default)
//! - The first path seen with a digest is the original; every later path
//!   sharing it forms a [`DuplicatePair`] with that original
//! - With `remove_duplicates`, the later copy is deleted as soon as it is
//!   found. The original is never deleted
//! - A file that vanishes or cannot be read is logged as a warning and the
//!   scan continues
//!
//! Digest equality is treated as content equality.
//!
//! ## Parallel hashing
//! With [`DetectConfig::parallel`] the walk is read up front and digests are
//! computed on the rayon pool. Pairs are still accumulated in walk order, so
//! results match a sequential run.

use crate::core::checksum::{compute_checksum, ChecksumAlgorithm};
use crate::core::scanner::{record_warning, DirectoryWalker, WalkConfig, WalkEntry};
use crate::error::{Result, ScanWarning};
use crate::events::{null_sender, DuplicateEvent, Event, EventSender};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Configuration for a duplicate scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectConfig {
    pub algorithm: ChecksumAlgorithm,
    /// Delete each later-seen duplicate
    pub remove_duplicates: bool,
    /// Hash hidden files too (off by default)
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    /// Compute digests on the rayon pool
    pub parallel: bool,
}

impl DetectConfig {
    pub fn with_removal(mut self, remove: bool) -> Self {
        self.remove_duplicates = remove;
        self
    }

    pub fn with_algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
            max_depth: None,
        }
    }
}

/// A file whose content matches an earlier one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// First path seen with this digest
    pub original: PathBuf,
    /// A later path with the same digest
    pub duplicate: PathBuf,
    pub digest: String,
}

/// Result of a duplicate scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateScan {
    /// Pairs in walk order, including ones whose duplicate was removed
    pub pairs: Vec<DuplicatePair>,
    /// Duplicates actually deleted
    pub removed: Vec<PathBuf>,
    pub files_hashed: usize,
    pub algorithm: ChecksumAlgorithm,
    pub warnings: Vec<ScanWarning>,
    pub duration_ms: u64,
}

impl DuplicateScan {
    /// Pairs grouped by original, originals in walk order
    pub fn groups(&self) -> Vec<(&Path, Vec<&Path>)> {
        let mut groups: Vec<(&Path, Vec<&Path>)> = Vec::new();
        let mut index: HashMap<&Path, usize> = HashMap::new();

        for pair in &self.pairs {
            let slot = *index.entry(pair.original.as_path()).or_insert_with(|| {
                groups.push((pair.original.as_path(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(pair.duplicate.as_path());
        }
        groups
    }
}

/// Digest to first-seen path, scoped to one scan
#[derive(Debug, Default)]
struct DigestIndex {
    first_seen: HashMap<String, PathBuf>,
}

impl DigestIndex {
    /// Record `path`; returns the original when the digest was already seen
    fn observe(&mut self, digest: &str, path: &Path) -> Option<PathBuf> {
        match self.first_seen.get(digest) {
            Some(original) => Some(original.clone()),
            None => {
                self.first_seen.insert(digest.to_string(), path.to_path_buf());
                None
            }
        }
    }
}

/// Finds duplicate files below a root directory
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    config: DetectConfig,
}

impl DuplicateDetector {
    pub fn new(config: DetectConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, root: &Path) -> Result<DuplicateScan> {
        self.detect_with_events(root, &null_sender())
    }

    /// Scan `root`, reporting progress through `events`.
    ///
    /// # Errors
    /// Only when `root` itself cannot be walked; per-file problems become
    /// warnings in the returned scan.
    pub fn detect_with_events(&self, root: &Path, events: &EventSender) -> Result<DuplicateScan> {
        let start = Instant::now();
        let walker = DirectoryWalker::new(self.config.walk_config());
        let files = walker.files(root)?;

        events.send(Event::Duplicate(DuplicateEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut scan = ScanState::new(&self.config, events);

        if self.config.parallel {
            let mut listed: Vec<WalkEntry> = Vec::new();
            for entry in files {
                match entry {
                    Ok(file) => listed.push(file),
                    Err(warning) => scan.warn(warning),
                }
            }

            let algorithm = self.config.algorithm;
            let digests: Vec<_> = listed
                .into_par_iter()
                .map(|file| {
                    let digest = compute_checksum(&file.path, algorithm);
                    (file.path, digest)
                })
                .collect();

            for (path, digest) in digests {
                scan.accept(path, digest);
            }
        } else {
            for entry in files {
                match entry {
                    Ok(file) => {
                        let digest = compute_checksum(&file.path, self.config.algorithm);
                        scan.accept(file.path, digest);
                    }
                    Err(warning) => scan.warn(warning),
                }
            }
        }

        let result = scan.finish(start);
        info!(
            root = %root.display(),
            files_hashed = result.files_hashed,
            duplicates = result.pairs.len(),
            removed = result.removed.len(),
            "duplicate scan complete"
        );
        Ok(result)
    }
}

/// Accumulator for one scan, fed in walk order
struct ScanState<'a> {
    config: &'a DetectConfig,
    events: &'a EventSender,
    index: DigestIndex,
    pairs: Vec<DuplicatePair>,
    removed: Vec<PathBuf>,
    warnings: Vec<ScanWarning>,
    files_hashed: usize,
}

impl<'a> ScanState<'a> {
    fn new(config: &'a DetectConfig, events: &'a EventSender) -> Self {
        Self {
            config,
            events,
            index: DigestIndex::default(),
            pairs: Vec::new(),
            removed: Vec::new(),
            warnings: Vec::new(),
            files_hashed: 0,
        }
    }

    fn warn(&mut self, warning: ScanWarning) {
        record_warning(warning, &mut self.warnings, self.events);
    }

    fn accept(&mut self, path: PathBuf, digest: Result<String>) {
        let digest = match digest {
            Ok(digest) => digest,
            Err(e) => {
                self.warn(ScanWarning::from(&e));
                return;
            }
        };

        self.files_hashed += 1;
        self.events.send(Event::Duplicate(DuplicateEvent::FileHashed {
            path: path.clone(),
            files_hashed: self.files_hashed,
        }));

        let Some(original) = self.index.observe(&digest, &path) else {
            return;
        };

        debug!(
            original = %original.display(),
            duplicate = %path.display(),
            "duplicate found"
        );
        self.events.send(Event::Duplicate(DuplicateEvent::DuplicateFound {
            original: original.clone(),
            duplicate: path.clone(),
        }));

        if self.config.remove_duplicates {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed duplicate");
                    self.events.send(Event::Duplicate(DuplicateEvent::DuplicateRemoved {
                        path: path.clone(),
                    }));
                    self.removed.push(path.clone());
                }
                Err(e) => self.warn(ScanWarning::new(
                    &path,
                    format!("failed to remove duplicate: {}", e),
                )),
            }
        }

        self.pairs.push(DuplicatePair {
            original,
            duplicate: path,
            digest,
        });
    }

    fn finish(self, start: Instant) -> DuplicateScan {
        self.events.send(Event::Duplicate(DuplicateEvent::Completed {
            files_hashed: self.files_hashed,
            duplicates: self.pairs.len(),
        }));

        DuplicateScan {
            pairs: self.pairs,
            removed: self.removed,
            files_hashed: self.files_hashed,
            algorithm: self.config.algorithm,
            warnings: self.warnings,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Detect duplicates under `root` with sha256, optionally deleting later copies
pub fn detect_duplicates(root: &Path, remove_duplicates: bool) -> Result<Vec<DuplicatePair>> {
    let config = DetectConfig::default().with_removal(remove_duplicates);
    Ok(DuplicateDetector::new(config).detect(root)?.pairs)
}
