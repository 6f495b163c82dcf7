//! # Metadata Module
//!
//! Extracts filesystem metadata from archive files and validates records.
//!
//! ## Extracted Fields
//! - Name and containing folder
//! - Size (bytes and human readable)
//! - Inferred type (via a [`TypeClassifier`], `"unknown"` when undetermined)
//! - Extension, including the leading dot (`".pdf"`)
//! - Created and modified timestamps, local time
//!
//! ## Missing values
//! A record is a fixed struct, so a field can never be absent. A field whose
//! value is empty reads as `None` through [`FileMetadata::field_value`], and
//! grouping code substitutes [`UNKNOWN_VALUE`] for it.

use crate::core::classifier::{ExtensionClassifier, TypeClassifier};
use crate::error::{ArchiveError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Format used whenever a timestamp is rendered as text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Group name used when a field has no value
pub const UNKNOWN_VALUE: &str = "Unknown";

/// Metadata for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File name with extension
    pub name: String,
    /// Human readable size (e.g., "1.5 KB")
    pub size: String,
    /// Exact size in bytes
    pub size_bytes: u64,
    /// MIME-like type, `"unknown"` when the classifier gives up
    pub mime_type: String,
    /// Extension with its leading dot, empty when there is none
    pub extension: String,
    /// Containing folder
    pub folder: PathBuf,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
}

/// Selector for one field of [`FileMetadata`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Name,
    Size,
    SizeBytes,
    Type,
    Extension,
    Folder,
    Created,
    Modified,
}

impl MetadataField {
    pub const ALL: [MetadataField; 8] = [
        MetadataField::Name,
        MetadataField::Size,
        MetadataField::SizeBytes,
        MetadataField::Type,
        MetadataField::Extension,
        MetadataField::Folder,
        MetadataField::Created,
        MetadataField::Modified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::Name => "name",
            MetadataField::Size => "size",
            MetadataField::SizeBytes => "size_bytes",
            MetadataField::Type => "type",
            MetadataField::Extension => "extension",
            MetadataField::Folder => "folder",
            MetadataField::Created => "created",
            MetadataField::Modified => "modified",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataField {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(MetadataField::Name),
            "size" => Ok(MetadataField::Size),
            "size_bytes" | "sizebytes" => Ok(MetadataField::SizeBytes),
            "type" | "mime_type" | "mimetype" => Ok(MetadataField::Type),
            "extension" | "ext" => Ok(MetadataField::Extension),
            "folder" => Ok(MetadataField::Folder),
            "created" => Ok(MetadataField::Created),
            "modified" => Ok(MetadataField::Modified),
            _ => Err(ArchiveError::UnknownField {
                name: s.to_string(),
            }),
        }
    }
}

impl FileMetadata {
    /// Text value of a field, `None` when it is empty.
    ///
    /// Numeric zero is a value, not an empty field.
    pub fn field_value(&self, field: MetadataField) -> Option<String> {
        let value = match field {
            MetadataField::Name => self.name.clone(),
            MetadataField::Size => self.size.clone(),
            MetadataField::SizeBytes => self.size_bytes.to_string(),
            MetadataField::Type => self.mime_type.clone(),
            MetadataField::Extension => self.extension.clone(),
            MetadataField::Folder => self.folder.display().to_string(),
            MetadataField::Created => self.created.format(TIMESTAMP_FORMAT).to_string(),
            MetadataField::Modified => self.modified.format(TIMESTAMP_FORMAT).to_string(),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Value used to group this file, [`UNKNOWN_VALUE`] when the field is empty
    pub fn group_value(&self, field: MetadataField) -> String {
        self.field_value(field)
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
    }

    /// Creation month bucket, `"YYYY-MM"`
    pub fn created_month(&self) -> String {
        self.created.format("%Y-%m").to_string()
    }
}

/// Check that every required field is known and non-empty.
///
/// An unrecognised field name counts as absent. Pure: the record is only read.
pub fn validate_fields<S: AsRef<str>>(metadata: &FileMetadata, required: &[S]) -> bool {
    required.iter().all(|name| {
        name.as_ref()
            .parse::<MetadataField>()
            .ok()
            .and_then(|field| metadata.field_value(field))
            .is_some()
    })
}

/// Extracts [`FileMetadata`] using a pluggable type classifier
#[derive(Clone)]
pub struct MetadataExtractor {
    classifier: Arc<dyn TypeClassifier>,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(ExtensionClassifier::new()),
        }
    }

    /// Use a different type classifier
    pub fn with_classifier(classifier: Arc<dyn TypeClassifier>) -> Self {
        Self { classifier }
    }

    /// Inspect `path`.
    ///
    /// # Errors
    /// `NotFound` when the path does not exist at call time, `Io` for any other
    /// stat failure or when the path is not a regular file.
    pub fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let stat = fs::metadata(path).map_err(|e| ArchiveError::from_io(path, e))?;
        if !stat.is_file() {
            return Err(ArchiveError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let size_bytes = stat.len();
        let modified = stat.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let metadata = FileMetadata {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: format_size(size_bytes),
            size_bytes,
            mime_type: self.classifier.classify_or_unknown(path),
            extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
            folder: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            created: DateTime::<Local>::from(creation_time(&stat)),
            modified: DateTime::<Local>::from(modified),
        };

        debug!(
            path = %path.display(),
            mime_type = %metadata.mime_type,
            size = metadata.size_bytes,
            "extracted metadata"
        );
        Ok(metadata)
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract metadata with the default classifier
pub fn extract_metadata(path: &Path) -> Result<FileMetadata> {
    MetadataExtractor::new().extract(path)
}

/// Birth time where the platform records it, else the inode change time, else mtime
fn creation_time(stat: &fs::Metadata) -> SystemTime {
    if let Ok(created) = stat.created() {
        return created;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        use std::time::Duration;

        let ctime = Duration::new(
            stat.ctime().max(0) as u64,
            stat.ctime_nsec().clamp(0, 999_999_999) as u32,
        );
        if let Some(time) = SystemTime::UNIX_EPOCH.checked_add(ctime) {
            return time;
        }
    }

    stat.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Format bytes as a human-readable string
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
