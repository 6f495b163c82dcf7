//! # Organize Module
//!
//! Relocates files into per-group folders named after a metadata field.
//!
//! ## Flow
//! 1. [`OrganizePlanner`] walks the root, extracts metadata and decides a
//!    destination `root/<group>/<file name>` for every non-hidden file
//! 2. [`OrganizeExecutor`] creates the folders and moves the files
//!
//! ## Conflicts
//! An occupied destination gets `_1`, `_2`, ... before the extension.
//! Existing files are never overwritten.
//!
//! ## Failure policy
//! Stricter than the other bulk scans: a file that vanishes between listing
//! and moving aborts the run with `NotFound`. Moves already done are kept.

mod executor;
mod planner;
mod types;

pub use executor::OrganizeExecutor;
pub use planner::OrganizePlanner;
pub use types::*;

use crate::core::metadata::{MetadataExtractor, MetadataField};
use crate::error::Result;
use crate::events::{null_sender, EventSender};
use std::path::Path;

/// Organizes a directory tree by one metadata field
#[derive(Clone, Default)]
pub struct Organizer {
    config: OrganizeConfig,
    extractor: MetadataExtractor,
}

impl Organizer {
    pub fn new(config: OrganizeConfig) -> Self {
        Self {
            config,
            extractor: MetadataExtractor::new(),
        }
    }

    /// Use a custom extractor (e.g. one with a different type classifier)
    pub fn with_extractor(mut self, extractor: MetadataExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Compute the moves without touching the filesystem
    pub fn plan(&self, root: &Path) -> Result<OrganizePlan> {
        OrganizePlanner::create_plan(root, &self.config, &self.extractor, &null_sender())
    }

    pub fn organize(&self, root: &Path) -> Result<OrganizeResult> {
        self.organize_with_events(root, &null_sender())
    }

    pub fn organize_with_events(&self, root: &Path, events: &EventSender) -> Result<OrganizeResult> {
        let plan = OrganizePlanner::create_plan(root, &self.config, &self.extractor, events)?;
        OrganizeExecutor::execute(&plan, events)
    }
}

/// Organize `root` by `field` with default settings, returning the number of files moved
pub fn organize_by_metadata(root: &Path, field: MetadataField) -> Result<usize> {
    Ok(Organizer::new(OrganizeConfig::by(field))
        .organize(root)?
        .files_moved)
}
