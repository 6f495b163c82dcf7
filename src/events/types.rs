//! Event type definitions for progress reporting.

use crate::error::ScanWarning;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the bulk operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Organize-by-metadata events
    Organize(OrganizeEvent),
    /// Duplicate detection events
    Duplicate(DuplicateEvent),
    /// Report generation events
    Report(ReportEvent),
    /// A recoverable problem; the operation keeps going
    Warning(ScanWarning),
}

/// Events while organizing files into group folders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// Listing is done and moving is about to begin
    Started { root: PathBuf, total_files: usize },
    /// A file was relocated
    FileMoved { from: PathBuf, to: PathBuf },
    /// All files were processed
    Completed { files_moved: usize },
}

/// Events while looking for duplicate content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DuplicateEvent {
    Started { root: PathBuf },
    /// A digest was computed
    FileHashed { path: PathBuf, files_hashed: usize },
    /// A file shares its digest with an earlier one
    DuplicateFound { original: PathBuf, duplicate: PathBuf },
    /// The later copy was deleted
    DuplicateRemoved { path: PathBuf },
    Completed {
        files_hashed: usize,
        duplicates: usize,
    },
}

/// Events while building an archive report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportEvent {
    Started { root: PathBuf },
    /// A file was added to the aggregates
    FileCounted { path: PathBuf, files_counted: usize },
    /// The report file was written
    Written { output: PathBuf, total_files: usize },
}
