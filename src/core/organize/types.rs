//! Types for the organize module.

use crate::core::metadata::MetadataField;
use crate::core::scanner::WalkConfig;
use crate::error::ScanWarning;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeConfig {
    /// Metadata field whose value names the group folder
    pub field: MetadataField,
    /// Organize hidden files too (off by default)
    pub include_hidden: bool,
    /// Whether to follow symbolic links while walking
    pub follow_symlinks: bool,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            field: MetadataField::Type,
            include_hidden: false,
            follow_symlinks: false,
        }
    }
}

impl OrganizeConfig {
    pub fn by(field: MetadataField) -> Self {
        Self {
            field,
            ..Default::default()
        }
    }

    pub(crate) fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
            max_depth: None,
        }
    }
}

/// One planned relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Field value the file was grouped under
    pub group: String,
    pub size_bytes: u64,
    /// Destination was renamed with a numeric suffix
    pub has_conflict: bool,
}

/// Summary of files per group folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub folder: String,
    pub count: usize,
    pub size_bytes: u64,
}

/// The organization plan (preview, nothing moved yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizePlan {
    pub root: PathBuf,
    pub field: MetadataField,
    /// Moves in walk order
    pub moves: Vec<PlannedMove>,
    pub by_group: Vec<GroupSummary>,
    /// Files already sitting in their group folder
    pub already_in_place: usize,
    pub conflict_count: usize,
    pub warnings: Vec<ScanWarning>,
}

/// Result of executing a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub files_moved: usize,
    pub folders_created: usize,
    pub total_size_bytes: u64,
    /// Moves actually performed, with their final destinations
    pub moves: Vec<PlannedMove>,
    pub already_in_place: usize,
    pub duration_ms: u64,
    /// Recoverable walk problems met while planning
    pub warnings: Vec<ScanWarning>,
}
