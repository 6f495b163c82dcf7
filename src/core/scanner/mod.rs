//! # Scanner Module
//!
//! Lazy recursive directory walking shared by organize, duplicate detection
//! and reporting.
//!
//! ## Policy
//! - Depth-unbounded by default, symlinks not followed
//! - Entries are visited sorted by file name inside each directory, so walk
//!   order is stable across runs
//! - Hidden entries (leading `.`) are skipped unless the config says
//!   otherwise; a hidden directory is skipped along with its contents
//! - The root itself is never yielded
//!
//! ## Example
//! ```rust,ignore
//! use archive_steward::core::scanner::{DirectoryWalker, WalkConfig};
//!
//! let walker = DirectoryWalker::new(WalkConfig::default());
//! for entry in walker.files(&root)? {
//!     match entry {
//!         Ok(file) => println!("{}", file.path.display()),
//!         Err(warning) => eprintln!("skipped: {}", warning),
//!     }
//! }
//! ```

mod walker;

pub use walker::{DirectoryWalker, Walk, WalkConfig};

use crate::error::ScanWarning;
use crate::events::{Event, EventSender};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::warn;

/// One entry produced by the walker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// False for directories
    pub is_file: bool,
    /// Size in bytes at the time the entry was visited
    pub size_bytes: u64,
}

/// Whether a file name marks a hidden entry
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Log a recoverable problem, forward it as an event and keep it for the result
pub(crate) fn record_warning(
    warning: ScanWarning,
    warnings: &mut Vec<ScanWarning>,
    events: &EventSender,
) {
    warn!(path = %warning.path.display(), "{}", warning.message);
    events.send(Event::Warning(warning.clone()));
    warnings.push(warning);
}
