//! # Archive Steward
//!
//! Maintenance passes over a directory tree of archived documents.
//!
//! ## Operations
//! - Extract per-file metadata and check required fields
//! - Compute md5, sha1 or sha256 checksums
//! - Organize files into folders by a metadata field, never overwriting
//! - Find duplicate files by content, optionally removing later copies
//! - Write a summary report of counts, sizes and the largest files
//!
//! ## Architecture
//! - `core` - The maintenance engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types and scan warnings
//!
//! The command-line front end lives in the binary.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ArchiveError, Result, ScanWarning};

/// Initialize tracing for the application.
///
/// Reads the filter from `RUST_LOG`. Only the binary calls this; a second
/// call leaves the first subscriber in place.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
