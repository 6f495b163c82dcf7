//! # CLI Module
//!
//! Command-line interface for archive maintenance.
//!
//! ## Usage
//! ```bash
//! # Inspect one file
//! archive-steward metadata notes.pdf --require name --require type
//! archive-steward checksum notes.pdf --algorithm md5
//!
//! # Bulk passes over a directory
//! archive-steward organize ~/Archive --field type
//! archive-steward duplicates ~/Archive --remove
//! archive-steward report ~/Archive report.txt --top 10
//!
//! # Helpers
//! archive-steward rename notes.pdf
//! archive-steward list ~/Archive .pdf
//! ```

use archive_steward::core::checksum::{compute_checksum, ChecksumAlgorithm};
use archive_steward::core::duplicates::{DetectConfig, DuplicateDetector, DuplicateScan};
use archive_steward::core::files::{list_files_by_extension, rename_with_id};
use archive_steward::core::metadata::{
    extract_metadata, format_size, validate_fields, FileMetadata, MetadataField, TIMESTAMP_FORMAT,
};
use archive_steward::core::organize::{OrganizeConfig, OrganizeResult, Organizer};
use archive_steward::core::reporter::{ReportConfig, ReportFormat, ReportGenerator};
use archive_steward::error::{ArchiveError, Result};
use archive_steward::events::{
    DuplicateEvent, Event, EventChannel, EventReceiver, OrganizeEvent, ReportEvent,
};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use uuid::Uuid;

/// Archive Steward - keep a document archive tidy
#[derive(Parser, Debug)]
#[command(name = "archive-steward")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the metadata record of a file
    Metadata {
        file: PathBuf,

        /// Field that must be present and non-empty (repeatable)
        #[arg(short, long = "require", value_name = "FIELD")]
        require: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Compute a file checksum
    Checksum {
        file: PathBuf,

        /// Digest algorithm
        #[arg(short, long, default_value = "sha256")]
        algorithm: Algorithm,
    },

    /// Move files into folders named after a metadata field
    Organize {
        dir: PathBuf,

        /// Field to group by (name, size, type, extension, created, modified, ...)
        #[arg(short, long, default_value = "type", value_parser = parse_field)]
        field: MetadataField,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,
    },

    /// Find files with identical content
    Duplicates {
        dir: PathBuf,

        /// Digest algorithm
        #[arg(short, long, default_value = "sha256")]
        algorithm: Algorithm,

        /// Delete every copy after the first one seen
        #[arg(long)]
        remove: bool,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Hash files on all cores
        #[arg(long)]
        parallel: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Write a summary report of a directory
    Report {
        dir: PathBuf,

        /// Report file to create or overwrite
        output: PathBuf,

        /// Leave hidden files out of the counts
        #[arg(long)]
        skip_hidden: bool,

        /// Number of largest files to list
        #[arg(long, default_value = "5")]
        top: usize,

        /// Report format
        #[arg(short, long, default_value = "text")]
        format: Format,
    },

    /// Append a unique id to a file name
    Rename {
        file: PathBuf,

        /// Id to append (random UUID when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// List files in a directory by extension (not recursive)
    List {
        dir: PathBuf,

        /// Extension, e.g. ".pdf"
        extension: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// MD5 - fast, legacy
    Md5,
    /// SHA-1 - legacy
    Sha1,
    /// SHA-256 (default)
    Sha256,
}

impl From<Algorithm> for ChecksumAlgorithm {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Md5 => ChecksumAlgorithm::Md5,
            Algorithm::Sha1 => ChecksumAlgorithm::Sha1,
            Algorithm::Sha256 => ChecksumAlgorithm::Sha256,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => ReportFormat::Text,
            Format::Json => ReportFormat::Json,
        }
    }
}

fn parse_field(value: &str) -> std::result::Result<MetadataField, String> {
    value.parse().map_err(|e: ArchiveError| e.to_string())
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let term = Term::stderr();

    match cli.command {
        Commands::Metadata {
            file,
            require,
            output,
        } => run_metadata(&term, &file, &require, output),
        Commands::Checksum { file, algorithm } => {
            let digest = compute_checksum(&file, algorithm.into())?;
            println!("{}  {}", digest, file.display());
            Ok(())
        }
        Commands::Organize {
            dir,
            field,
            include_hidden,
        } => run_organize(&term, &dir, field, include_hidden),
        Commands::Duplicates {
            dir,
            algorithm,
            remove,
            include_hidden,
            parallel,
            output,
        } => {
            let config = DetectConfig {
                algorithm: algorithm.into(),
                remove_duplicates: remove,
                include_hidden,
                parallel,
                ..DetectConfig::default()
            };
            run_duplicates(&term, &dir, config, output)
        }
        Commands::Report {
            dir,
            output,
            skip_hidden,
            top,
            format,
        } => {
            let config = ReportConfig::default()
                .with_hidden(!skip_hidden)
                .with_top_n(top)
                .with_format(format.into());
            run_report(&term, &dir, &output, config)
        }
        Commands::Rename { file, id } => {
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let renamed = rename_with_id(&file, &id)?;
            println!("{}", renamed.display());
            Ok(())
        }
        Commands::List { dir, extension } => {
            for path in list_files_by_extension(&dir, &extension)? {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn run_metadata(
    term: &Term,
    file: &Path,
    require: &[String],
    output: OutputFormat,
) -> Result<()> {
    let metadata = extract_metadata(file)?;

    match output {
        OutputFormat::Pretty => print_metadata(term, &metadata),
        OutputFormat::Json => print_json(&metadata)?,
        OutputFormat::Minimal => println!("{}", metadata.name),
    }

    if require.is_empty() || validate_fields(&metadata, require) {
        return Ok(());
    }

    let missing: Vec<&str> = require
        .iter()
        .map(String::as_str)
        .filter(|name| !validate_fields(&metadata, &[*name]))
        .collect();
    Err(ArchiveError::Config(format!(
        "{} is missing required field(s): {}",
        file.display(),
        missing.join(", ")
    )))
}

fn print_metadata(term: &Term, metadata: &FileMetadata) {
    term.write_line(&format!("{}", style(&metadata.name).bold().cyan()))
        .ok();
    let rows = [
        ("Size", format!("{} ({} bytes)", metadata.size, metadata.size_bytes)),
        ("Type", metadata.mime_type.clone()),
        ("Extension", metadata.extension.clone()),
        ("Folder", metadata.folder.display().to_string()),
        ("Created", metadata.created.format(TIMESTAMP_FORMAT).to_string()),
        ("Modified", metadata.modified.format(TIMESTAMP_FORMAT).to_string()),
    ];
    for (label, value) in rows {
        println!("  {:<10} {}", style(label).dim(), value);
    }
}

fn run_organize(term: &Term, dir: &Path, field: MetadataField, include_hidden: bool) -> Result<()> {
    let config = OrganizeConfig {
        include_hidden,
        ..OrganizeConfig::by(field)
    };
    let organizer = Organizer::new(config);

    let (sender, receiver) = EventChannel::new();
    let progress = spinner(&format!("Organizing by {}", field));
    let event_thread = spawn_progress(receiver, progress.clone());

    let result = organizer.organize_with_events(dir, &sender);

    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    print_organize_results(term, &result?);
    Ok(())
}

fn print_organize_results(term: &Term, result: &OrganizeResult) {
    term.write_line(&format!(
        "{} Organize Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} files moved into {} new folders ({}) in {:.1}s",
        style(result.files_moved).cyan(),
        style(result.folders_created).cyan(),
        format_size(result.total_size_bytes),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    if result.already_in_place > 0 {
        term.write_line(&format!(
            "  {} already in place",
            style(result.already_in_place).dim()
        ))
        .ok();
    }
    for planned in result.moves.iter().filter(|m| m.has_conflict) {
        term.write_line(&format!(
            "  {} {} renamed to {}",
            style("!").yellow(),
            planned.source.display(),
            planned.destination.display()
        ))
        .ok();
    }
    print_warning_count(term, result.warnings.len());
}

fn run_duplicates(term: &Term, dir: &Path, config: DetectConfig, output: OutputFormat) -> Result<()> {
    let detector = DuplicateDetector::new(config);

    let (sender, receiver) = EventChannel::new();
    let progress = if matches!(output, OutputFormat::Pretty) {
        spinner("Hashing files")
    } else {
        ProgressBar::hidden()
    };
    let event_thread = spawn_progress(receiver, progress.clone());

    let result = detector.detect_with_events(dir, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    let scan = result?;
    match output {
        OutputFormat::Pretty => print_duplicate_results(term, &scan),
        OutputFormat::Json => print_json(&scan)?,
        OutputFormat::Minimal => {
            for pair in &scan.pairs {
                println!("{}", pair.duplicate.display());
            }
        }
    }
    Ok(())
}

fn print_duplicate_results(term: &Term, scan: &DuplicateScan) {
    term.write_line(&format!(
        "{} Duplicate Scan Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} files hashed with {} in {:.1}s",
        style(scan.files_hashed).cyan(),
        scan.algorithm,
        scan.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates found, {} removed",
        style(scan.pairs.len()).cyan(),
        style(scan.removed.len()).cyan()
    ))
    .ok();
    term.write_line("").ok();

    if scan.pairs.is_empty() {
        term.write_line("  No duplicates found").ok();
    }

    for (original, duplicates) in scan.groups() {
        term.write_line(&format!("  {} {}", style("★").green(), original.display()))
            .ok();
        for duplicate in duplicates {
            let marker = if scan.removed.iter().any(|r| r == duplicate) {
                style("✗").red().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!("    {} {}", marker, duplicate.display()))
                .ok();
        }
    }
    print_warning_count(term, scan.warnings.len());
}

fn run_report(term: &Term, dir: &Path, output: &Path, config: ReportConfig) -> Result<()> {
    let generator = ReportGenerator::new(config);

    let (sender, receiver) = EventChannel::new();
    let progress = spinner("Building report");
    let event_thread = spawn_progress(receiver, progress.clone());

    let result = generator.generate_with_events(dir, output, &sender);

    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    let data = result?;
    term.write_line(&format!(
        "{} Report written to {}",
        style("✓").green().bold(),
        output.display()
    ))
    .ok();
    term.write_line(&format!(
        "  {} files, {}",
        style(data.total_files).cyan(),
        format_size(data.total_size_bytes)
    ))
    .ok();
    print_warning_count(term, data.warnings.len());
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{pos}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}

/// Drive `progress` from events until every sender is dropped
fn spawn_progress(receiver: EventReceiver, progress: ProgressBar) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Organize(OrganizeEvent::Started { total_files, .. }) => {
                    progress.set_length(total_files as u64);
                }
                Event::Organize(OrganizeEvent::FileMoved { .. }) => progress.inc(1),
                Event::Duplicate(DuplicateEvent::FileHashed { files_hashed, .. }) => {
                    progress.set_position(files_hashed as u64);
                }
                Event::Report(ReportEvent::FileCounted { files_counted, .. }) => {
                    progress.set_position(files_counted as u64);
                }
                Event::Warning(warning) => {
                    progress.println(format!("{} {}", style("warning:").yellow(), warning));
                }
                _ => progress.tick(),
            }
        }
    })
}

fn print_warning_count(term: &Term, count: usize) {
    if count > 0 {
        term.write_line(&format!(
            "  {} entries skipped (see warnings above)",
            style(count).yellow()
        ))
        .ok();
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ArchiveError::Config(format!("cannot encode JSON output: {}", e)))?;
    println!("{}", text);
    Ok(())
}
