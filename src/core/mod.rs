//! # Core Module
//!
//! The archive maintenance engine, independent of any front end.
//!
//! ## Modules
//! - `metadata` - Extracts file records and validates required fields
//! - `classifier` - Infers a file's type
//! - `checksum` - Streams files through md5, sha1 or sha256
//! - `scanner` - Walks directory trees, skipping hidden entries
//! - `organize` - Moves files into folders named after a metadata field
//! - `duplicates` - Finds (and optionally removes) byte-identical files
//! - `reporter` - Summarizes an archive into a text or JSON report
//! - `files` - Single-file rename and listing helpers

pub mod checksum;
pub mod classifier;
pub mod duplicates;
pub mod files;
pub mod metadata;
pub mod organize;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use checksum::{compute_checksum, ChecksumAlgorithm};
pub use duplicates::{detect_duplicates, DetectConfig, DuplicateDetector, DuplicatePair};
pub use metadata::{extract_metadata, validate_fields, FileMetadata, MetadataField};
pub use organize::{organize_by_metadata, OrganizeConfig, Organizer};
pub use reporter::{generate_report, ReportConfig, ReportGenerator};
pub use scanner::{DirectoryWalker, WalkConfig, WalkEntry};
