//! # Reporter Module
//!
//! Summarizes an archive in one walk and writes a text report.
//!
//! ## Aggregates
//! - Total files and total size
//! - Count per inferred type
//! - Count per creation month (`YYYY-MM`, local time)
//! - The largest files, descending by size, ties in walk order
//!
//! ## Hidden files
//! Included by default, unlike organize and duplicate detection. Set
//! [`ReportConfig::include_hidden`] to `false` to match those passes.
//!
//! Files that vanish or cannot be read mid-scan are logged, left out of the
//! aggregates and counted under `Skipped Files`.

mod export;

pub use export::{render_json, render_text, write_report, ReportFormat};

use crate::core::metadata::MetadataExtractor;
use crate::core::scanner::{record_warning, DirectoryWalker, WalkConfig};
use crate::error::{Result, ScanWarning};
use crate::events::{null_sender, Event, EventSender, ReportEvent};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of largest files listed by default
pub const DEFAULT_TOP_N: usize = 5;

/// Configuration for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Count hidden files (on by default)
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    /// How many of the largest files to list
    pub top_n: usize,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_hidden: true,
            follow_symlinks: false,
            top_n: DEFAULT_TOP_N,
            format: ReportFormat::Text,
        }
    }
}

impl ReportConfig {
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }
}

/// One entry of the largest-files list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestFile {
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Aggregates for one report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveReportData {
    pub root: PathBuf,
    pub generated_at: DateTime<Local>,
    pub total_files: usize,
    pub total_size_bytes: u64,
    /// Type to count
    pub type_counts: BTreeMap<String, usize>,
    /// `YYYY-MM` to count
    pub month_counts: BTreeMap<String, usize>,
    /// Descending by size, ties in walk order, at most `top_n` entries
    pub largest: Vec<LargestFile>,
    pub top_n: usize,
    /// Files left out of the aggregates
    pub warnings: Vec<ScanWarning>,
}

impl ArchiveReportData {
    /// Types by count descending, then by name
    pub fn types_by_count(&self) -> Vec<(&str, usize)> {
        let mut types: Vec<(&str, usize)> = self
            .type_counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        types
    }
}

/// Builds and writes archive reports
#[derive(Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
    extractor: MetadataExtractor,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            extractor: MetadataExtractor::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: MetadataExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Aggregate `root` without writing anything
    pub fn collect(&self, root: &Path) -> Result<ArchiveReportData> {
        self.collect_with_events(root, &null_sender())
    }

    /// Aggregate `root`.
    ///
    /// # Errors
    /// Only when `root` itself cannot be walked.
    pub fn collect_with_events(&self, root: &Path, events: &EventSender) -> Result<ArchiveReportData> {
        let walker = DirectoryWalker::new(WalkConfig {
            follow_symlinks: self.config.follow_symlinks,
            include_hidden: self.config.include_hidden,
            max_depth: None,
        });
        let files = walker.files(root)?;

        events.send(Event::Report(ReportEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut warnings = Vec::new();
        let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut month_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut sizes: Vec<LargestFile> = Vec::new();
        let mut total_size_bytes = 0u64;

        for entry in files {
            let file = match entry {
                Ok(file) => file,
                Err(warning) => {
                    record_warning(warning, &mut warnings, events);
                    continue;
                }
            };

            let metadata = match self.extractor.extract(&file.path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    record_warning(ScanWarning::from(&e), &mut warnings, events);
                    continue;
                }
            };

            total_size_bytes += metadata.size_bytes;
            *type_counts.entry(metadata.mime_type.clone()).or_insert(0) += 1;
            *month_counts.entry(metadata.created_month()).or_insert(0) += 1;
            sizes.push(LargestFile {
                size_bytes: metadata.size_bytes,
                path: file.path.clone(),
            });

            events.send(Event::Report(ReportEvent::FileCounted {
                path: file.path,
                files_counted: sizes.len(),
            }));
        }

        let total_files = sizes.len();
        // Stable sort keeps walk order among equal sizes
        sizes.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        sizes.truncate(self.config.top_n);

        Ok(ArchiveReportData {
            root: root.to_path_buf(),
            generated_at: Local::now(),
            total_files,
            total_size_bytes,
            type_counts,
            month_counts,
            largest: sizes,
            top_n: self.config.top_n,
            warnings,
        })
    }

    /// Aggregate `root` and write the report to `output`, replacing any existing file
    pub fn generate(&self, root: &Path, output: &Path) -> Result<ArchiveReportData> {
        self.generate_with_events(root, output, &null_sender())
    }

    pub fn generate_with_events(
        &self,
        root: &Path,
        output: &Path,
        events: &EventSender,
    ) -> Result<ArchiveReportData> {
        let data = self.collect_with_events(root, events)?;
        write_report(&data, output, self.config.format)?;

        events.send(Event::Report(ReportEvent::Written {
            output: output.to_path_buf(),
            total_files: data.total_files,
        }));
        info!(
            root = %root.display(),
            output = %output.display(),
            total_files = data.total_files,
            skipped = data.warnings.len(),
            "report written"
        );
        Ok(data)
    }
}

/// Write a text report for `root` to `output` with default settings
pub fn generate_report(root: &Path, output: &Path) -> Result<()> {
    ReportGenerator::default().generate(root, output).map(|_| ())
}
