//! Report rendering.
//!
//! The text layout is fixed: header, totals, by type, by month, largest
//! files, always in that order and always present.

use super::ArchiveReportData;
use crate::core::metadata::{format_size, TIMESTAMP_FORMAT};
use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human readable sections
    #[default]
    Text,
    /// Pretty-printed aggregates
    Json,
}

/// Render the text report
pub fn render_text<W: Write>(data: &ArchiveReportData, mut writer: W) -> io::Result<()> {
    heading(&mut writer, "Archive Report", '=')?;
    writeln!(writer, "Directory: {}", data.root.display())?;
    writeln!(
        writer,
        "Generated: {}",
        data.generated_at.format(TIMESTAMP_FORMAT)
    )?;
    writeln!(writer)?;

    heading(&mut writer, "Totals", '-')?;
    writeln!(writer, "Total Files: {}", data.total_files)?;
    writeln!(
        writer,
        "Total Size: {} ({} bytes)",
        format_size(data.total_size_bytes),
        data.total_size_bytes
    )?;
    if !data.warnings.is_empty() {
        writeln!(writer, "Skipped Files: {}", data.warnings.len())?;
    }
    writeln!(writer)?;

    heading(&mut writer, "Files by Type", '-')?;
    if data.type_counts.is_empty() {
        writeln!(writer, "(none)")?;
    }
    for (mime_type, count) in data.types_by_count() {
        writeln!(writer, "{}: {}", mime_type, count)?;
    }
    writeln!(writer)?;

    heading(&mut writer, "Files by Month", '-')?;
    if data.month_counts.is_empty() {
        writeln!(writer, "(none)")?;
    }
    for (month, count) in &data.month_counts {
        writeln!(writer, "{}: {}", month, count)?;
    }
    writeln!(writer)?;

    heading(&mut writer, &format!("Top {} Largest Files", data.top_n), '-')?;
    if data.largest.is_empty() {
        writeln!(writer, "(none)")?;
    }
    for (rank, file) in data.largest.iter().enumerate() {
        writeln!(
            writer,
            "{}. {} - {}",
            rank + 1,
            format_size(file.size_bytes),
            file.path.display()
        )?;
    }

    writer.flush()
}

/// Render the aggregates as pretty JSON
pub fn render_json<W: Write>(data: &ArchiveReportData, mut writer: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, data).map_err(io::Error::from)?;
    writeln!(writer)?;
    writer.flush()
}

/// Create (or truncate) `output` and render `data` into it
pub fn write_report(data: &ArchiveReportData, output: &Path, format: ReportFormat) -> Result<()> {
    let file = File::create(output).map_err(|e| ArchiveError::from_io(output, e))?;
    let writer = BufWriter::new(file);

    match format {
        ReportFormat::Text => render_text(data, writer),
        ReportFormat::Json => render_json(data, writer),
    }
    .map_err(|e| ArchiveError::from_io(output, e))
}

fn heading<W: Write>(writer: &mut W, title: &str, underline: char) -> io::Result<()> {
    writeln!(writer, "{}", title)?;
    writeln!(writer, "{}", underline.to_string().repeat(title.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::LargestFile;
    use crate::error::ScanWarning;
    use chrono::Local;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample_data() -> ArchiveReportData {
        ArchiveReportData {
            root: PathBuf::from("/archive"),
            generated_at: Local::now(),
            total_files: 3,
            total_size_bytes: 3072,
            type_counts: BTreeMap::from([
                ("application/pdf".to_string(), 1),
                ("text/plain".to_string(), 2),
            ]),
            month_counts: BTreeMap::from([
                ("2024-02".to_string(), 1),
                ("2023-11".to_string(), 2),
            ]),
            largest: vec![
                LargestFile {
                    size_bytes: 2048,
                    path: PathBuf::from("/archive/report.pdf"),
                },
                LargestFile {
                    size_bytes: 1024,
                    path: PathBuf::from("/archive/notes.txt"),
                },
            ],
            top_n: 5,
            warnings: vec![],
        }
    }

    fn render(data: &ArchiveReportData) -> String {
        let mut output = Vec::new();
        render_text(data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn sections_appear_in_order() {
        let text = render(&sample_data());

        let positions: Vec<usize> = [
            "Archive Report",
            "Totals",
            "Files by Type",
            "Files by Month",
            "Top 5 Largest Files",
        ]
        .iter()
        .map(|section| text.find(section).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn totals_and_entries_rendered() {
        let text = render(&sample_data());

        assert!(text.contains("Total Files: 3"));
        assert!(text.contains("Total Size: 3.0 KB (3072 bytes)"));
        assert!(text.contains("text/plain: 2"));
        assert!(text.contains("1. 2.0 KB - /archive/report.pdf"));
        assert!(text.contains("2. 1.0 KB - /archive/notes.txt"));
        assert!(!text.contains("Skipped Files"));
    }

    #[test]
    fn months_ascending() {
        let text = render(&sample_data());
        assert!(text.find("2023-11: 2").unwrap() < text.find("2024-02: 1").unwrap());
    }

    #[test]
    fn empty_sections_still_present() {
        let mut data = sample_data();
        data.total_files = 0;
        data.total_size_bytes = 0;
        data.type_counts.clear();
        data.month_counts.clear();
        data.largest.clear();

        let text = render(&data);
        assert!(text.contains("Total Files: 0"));
        assert_eq!(text.matches("(none)").count(), 3);
    }

    #[test]
    fn skipped_files_listed_in_totals() {
        let mut data = sample_data();
        data.warnings.push(ScanWarning {
            path: PathBuf::from("/archive/gone.txt"),
            message: "vanished".to_string(),
        });

        assert!(render(&data).contains("Skipped Files: 1"));
    }

    #[test]
    fn json_contains_aggregates() {
        let mut output = Vec::new();
        render_json(&sample_data(), &mut output).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["total_files"], 3);
        assert_eq!(value["type_counts"]["text/plain"], 2);
        assert_eq!(value["largest"][0]["size_bytes"], 2048);
    }
}
