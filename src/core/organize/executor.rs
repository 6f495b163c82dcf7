//! Executor for organization plans.

use super::planner::OrganizePlanner;
use super::types::*;
use crate::error::{ArchiveError, Result};
use crate::events::{Event, EventSender, OrganizeEvent};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Executes organization plans
pub struct OrganizeExecutor;

impl OrganizeExecutor {
    /// Move every planned file, in plan order.
    ///
    /// Not transactional: on error the files moved so far stay moved and the
    /// rest stay put. A destination that appeared since planning gets the
    /// next free numeric suffix; nothing is ever overwritten.
    ///
    /// # Errors
    /// `NotFound` when a planned source has vanished, `Io` for any other
    /// folder creation or move failure.
    pub fn execute(plan: &OrganizePlan, events: &EventSender) -> Result<OrganizeResult> {
        let start = Instant::now();

        events.send(Event::Organize(OrganizeEvent::Started {
            root: plan.root.clone(),
            total_files: plan.moves.len(),
        }));

        let mut created_dirs: HashSet<PathBuf> = HashSet::new();
        let mut done = Vec::with_capacity(plan.moves.len());
        let mut total_size = 0u64;

        for planned in &plan.moves {
            if let Some(parent) = planned.destination.parent() {
                if !parent.is_dir() {
                    fs::create_dir_all(parent).map_err(|e| ArchiveError::Io {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                    created_dirs.insert(parent.to_path_buf());
                }
            }

            let destination = if planned.destination.exists() {
                OrganizePlanner::unique_path(&planned.destination, &HashSet::new())
            } else {
                planned.destination.clone()
            };

            move_file(&planned.source, &destination)?;
            debug!(
                source = %planned.source.display(),
                destination = %destination.display(),
                "moved file"
            );
            events.send(Event::Organize(OrganizeEvent::FileMoved {
                from: planned.source.clone(),
                to: destination.clone(),
            }));

            total_size += planned.size_bytes;
            done.push(PlannedMove {
                has_conflict: planned.has_conflict || destination != planned.destination,
                destination,
                ..planned.clone()
            });
        }

        events.send(Event::Organize(OrganizeEvent::Completed {
            files_moved: done.len(),
        }));
        info!(
            root = %plan.root.display(),
            field = %plan.field,
            files_moved = done.len(),
            folders_created = created_dirs.len(),
            "organize complete"
        );

        Ok(OrganizeResult {
            files_moved: done.len(),
            folders_created: created_dirs.len(),
            total_size_bytes: total_size,
            moves: done,
            already_in_place: plan.already_in_place,
            duration_ms: start.elapsed().as_millis() as u64,
            warnings: plan.warnings.clone(),
        })
    }
}

/// Rename `source` to `destination`, copying across filesystems when needed
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if !source.exists() {
        return Err(ArchiveError::NotFound {
            path: source.to_path_buf(),
        });
    }

    fs::rename(source, destination)
        .or_else(|_| copy_then_remove(source, destination))
        .map_err(|e| ArchiveError::from_io(source, e))
}

/// Fallback when rename fails: copy, verify the size, then delete the source
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let source_size = fs::metadata(source)?.len();
    fs::copy(source, destination)?;

    let dest_size = fs::metadata(destination)?.len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "copy verification failed: source {} bytes, destination {} bytes",
                source_size, dest_size
            ),
        ));
    }

    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::MetadataField;
    use crate::events::null_sender;
    use tempfile::TempDir;

    fn single_move_plan(root: &Path, source: PathBuf, destination: PathBuf) -> OrganizePlan {
        OrganizePlan {
            root: root.to_path_buf(),
            field: MetadataField::Type,
            moves: vec![PlannedMove {
                source,
                destination,
                group: "text/plain".to_string(),
                size_bytes: 12,
                has_conflict: false,
            }],
            by_group: vec![],
            already_in_place: 0,
            conflict_count: 0,
            warnings: vec![],
        }
    }

    #[test]
    fn execute_moves_and_creates_folder() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        fs::write(&source, b"test content").unwrap();
        let destination = temp_dir.path().join("text_plain").join("notes.txt");

        let plan = single_move_plan(temp_dir.path(), source.clone(), destination.clone());
        let result = OrganizeExecutor::execute(&plan, &null_sender()).unwrap();

        assert_eq!(result.files_moved, 1);
        assert_eq!(result.folders_created, 1);
        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"test content");
    }

    #[test]
    fn execute_never_overwrites_late_arrival() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        fs::write(&source, b"incoming").unwrap();
        let folder = temp_dir.path().join("text_plain");
        fs::create_dir(&folder).unwrap();
        let destination = folder.join("notes.txt");

        let plan = single_move_plan(temp_dir.path(), source, destination.clone());
        // Appears after planning
        fs::write(&destination, b"already here").unwrap();

        let result = OrganizeExecutor::execute(&plan, &null_sender()).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"already here");
        assert_eq!(fs::read(folder.join("notes_1.txt")).unwrap(), b"incoming");
        assert!(result.moves[0].has_conflict);
        assert_eq!(result.folders_created, 0);
    }

    #[test]
    fn execute_vanished_source_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let plan = single_move_plan(
            temp_dir.path(),
            temp_dir.path().join("gone.txt"),
            temp_dir.path().join("text_plain").join("gone.txt"),
        );

        let result = OrganizeExecutor::execute(&plan, &null_sender());
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));
    }

    #[test]
    fn copy_fallback_preserves_content() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.bin");
        let destination = temp_dir.path().join("b.bin");
        fs::write(&source, b"payload").unwrap();

        copy_then_remove(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"payload");
    }
}
