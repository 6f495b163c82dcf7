//! Plan generator for organize operations.

use super::types::*;
use crate::core::metadata::{MetadataExtractor, UNKNOWN_VALUE};
use crate::core::scanner::{record_warning, DirectoryWalker};
use crate::error::{ArchiveError, Result, ScanWarning};
use crate::events::EventSender;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Generates organization plans
pub struct OrganizePlanner;

impl OrganizePlanner {
    /// Walk `root` and decide where every file goes.
    ///
    /// The full file list is read before anything is planned, so the group
    /// folders created later are never walked again.
    ///
    /// # Errors
    /// Fails if `root` is missing, or with `NotFound` when a listed file
    /// vanishes before its metadata can be read.
    pub fn create_plan(
        root: &Path,
        config: &OrganizeConfig,
        extractor: &MetadataExtractor,
        events: &EventSender,
    ) -> Result<OrganizePlan> {
        let walker = DirectoryWalker::new(config.walk_config());
        let mut warnings = Vec::new();
        let mut files = Vec::new();

        for entry in walker.files(root)? {
            match entry {
                Ok(file) => files.push(file),
                Err(warning) => {
                    Self::fail_if_vanished(&warning)?;
                    record_warning(warning, &mut warnings, events);
                }
            }
        }

        let mut moves = Vec::new();
        let mut by_group: BTreeMap<String, (usize, u64)> = BTreeMap::new();
        let mut folders: HashMap<String, PathBuf> = HashMap::new();
        let mut claimed_folders: HashSet<PathBuf> = HashSet::new();
        let mut taken: HashSet<PathBuf> = HashSet::new();
        let mut already_in_place = 0;
        let mut conflict_count = 0;

        for file in files {
            let metadata = extractor.extract(&file.path)?;
            let group = metadata.group_value(config.field);
            let folder = folders
                .entry(Self::folder_name(&group))
                .or_insert_with_key(|name| {
                    let dir = Self::resolve_folder(&root.join(name), &claimed_folders);
                    claimed_folders.insert(dir.clone());
                    dir
                })
                .clone();
            let target = folder.join(&metadata.name);

            let folder_label = folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let summary = by_group.entry(folder_label).or_insert((0, 0));
            summary.0 += 1;
            summary.1 += metadata.size_bytes;

            if target == file.path {
                already_in_place += 1;
                taken.insert(target);
                continue;
            }

            let destination = Self::unique_path(&target, &taken);
            let has_conflict = destination != target;
            if has_conflict {
                conflict_count += 1;
            }
            taken.insert(destination.clone());

            debug!(
                source = %file.path.display(),
                destination = %destination.display(),
                %group,
                "planned move"
            );
            moves.push(PlannedMove {
                source: file.path,
                destination,
                group,
                size_bytes: metadata.size_bytes,
                has_conflict,
            });
        }

        Ok(OrganizePlan {
            root: root.to_path_buf(),
            field: config.field,
            moves,
            by_group: by_group
                .into_iter()
                .map(|(folder, (count, size_bytes))| GroupSummary {
                    folder,
                    count,
                    size_bytes,
                })
                .collect(),
            already_in_place,
            conflict_count,
            warnings,
        })
    }

    /// Folder name for a group value.
    ///
    /// Spaces and path separators become `_` and leading dots are dropped, so
    /// `.pdf` groups into a visible `pdf` folder.
    pub fn folder_name(value: &str) -> String {
        let name: String = value
            .trim_start_matches('.')
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                other => other,
            })
            .collect();
        if name.is_empty() {
            UNKNOWN_VALUE.to_string()
        } else {
            name
        }
    }

    /// Group folder for `dir`: itself when it is a directory or absent,
    /// otherwise the first `_1`, `_2`, ... variant that is. Folders already
    /// claimed by another group are skipped.
    fn resolve_folder(dir: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
        Self::first_free(dir, |candidate| {
            !claimed.contains(candidate) && (candidate.is_dir() || !candidate.exists())
        })
    }

    /// First free variant of `path`: `name.ext`, then `name_1.ext`, `name_2.ext`, ...
    ///
    /// A candidate is taken if it exists on disk or is in `reserved`.
    pub fn unique_path(path: &Path, reserved: &HashSet<PathBuf>) -> PathBuf {
        Self::first_free(path, |candidate| {
            !candidate.exists() && !reserved.contains(candidate)
        })
    }

    fn first_free(path: &Path, is_free: impl Fn(&Path) -> bool) -> PathBuf {
        if is_free(path) {
            return path.to_path_buf();
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
        let parent = path.parent().unwrap_or(Path::new(""));

        let mut counter = 1;
        loop {
            let new_name = match &ext {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", stem, counter),
            };
            let candidate = parent.join(new_name);
            if is_free(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// A walk entry that is gone by the time it is listed aborts the plan
    fn fail_if_vanished(warning: &ScanWarning) -> Result<()> {
        match fs::symlink_metadata(&warning.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ArchiveError::NotFound {
                path: warning.path.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::MetadataField;
    use crate::events::null_sender;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn folder_name_replaces_spaces_and_separators() {
        assert_eq!(OrganizePlanner::folder_name("text/plain"), "text_plain");
        assert_eq!(
            OrganizePlanner::folder_name("2024-01-15 14:30:00"),
            "2024-01-15_14:30:00"
        );
        assert_eq!(OrganizePlanner::folder_name("Unknown"), "Unknown");
    }

    #[test]
    fn folder_name_drops_leading_dots() {
        assert_eq!(OrganizePlanner::folder_name(".pdf"), "pdf");
        assert_eq!(OrganizePlanner::folder_name("..."), "Unknown");
    }

    #[test]
    fn plan_skips_folder_name_taken_by_a_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("text_plain"), b"loose").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"notes").unwrap();

        let plan = OrganizePlanner::create_plan(
            temp_dir.path(),
            &OrganizeConfig::default(),
            &MetadataExtractor::new(),
            &null_sender(),
        )
        .unwrap();

        let notes = plan
            .moves
            .iter()
            .find(|m| m.source.ends_with("notes.txt"))
            .unwrap();
        assert_eq!(
            notes.destination,
            temp_dir.path().join("text_plain_1").join("notes.txt")
        );
    }

    #[test]
    fn plan_by_name_never_nests_under_the_file_itself() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();

        let plan = OrganizePlanner::create_plan(
            temp_dir.path(),
            &OrganizeConfig::by(MetadataField::Name),
            &MetadataExtractor::new(),
            &null_sender(),
        )
        .unwrap();

        assert_eq!(
            plan.moves[0].destination,
            temp_dir.path().join("a_1.txt").join("a.txt")
        );
    }

    #[test]
    fn vanished_entry_fails_the_plan() {
        let temp_dir = TempDir::new().unwrap();
        let gone = ScanWarning::new(&temp_dir.path().join("gone.txt"), "vanished");
        let present = ScanWarning::new(temp_dir.path(), "permission denied");

        assert!(matches!(
            OrganizePlanner::fail_if_vanished(&gone),
            Err(ArchiveError::NotFound { .. })
        ));
        assert!(OrganizePlanner::fail_if_vanished(&present).is_ok());
    }

    #[test]
    fn unique_path_appends_counter_before_extension() {
        let reserved: HashSet<PathBuf> = vec![
            PathBuf::from("/nonexistent/dest/report.pdf"),
            PathBuf::from("/nonexistent/dest/report_1.pdf"),
        ]
        .into_iter()
        .collect();

        let unique =
            OrganizePlanner::unique_path(Path::new("/nonexistent/dest/report.pdf"), &reserved);
        assert_eq!(unique, PathBuf::from("/nonexistent/dest/report_2.pdf"));
    }

    #[test]
    fn unique_path_without_extension() {
        let reserved: HashSet<PathBuf> = [PathBuf::from("/nonexistent/dest/README")].into();
        let unique = OrganizePlanner::unique_path(Path::new("/nonexistent/dest/README"), &reserved);
        assert_eq!(unique, PathBuf::from("/nonexistent/dest/README_1"));
    }

    #[test]
    fn unique_path_checks_disk() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("notes.txt");
        fs::write(&existing, b"taken").unwrap();

        let unique = OrganizePlanner::unique_path(&existing, &HashSet::new());
        assert_eq!(unique, temp_dir.path().join("notes_1.txt"));
    }

    #[test]
    fn plan_groups_by_type_without_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.pdf"), b"%PDF-1.4").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"text").unwrap();

        let plan = OrganizePlanner::create_plan(
            temp_dir.path(),
            &OrganizeConfig::by(MetadataField::Type),
            &MetadataExtractor::new(),
            &null_sender(),
        )
        .unwrap();

        assert_eq!(plan.moves.len(), 2);
        assert_eq!(
            plan.moves[0].destination,
            temp_dir.path().join("application_pdf").join("a.pdf")
        );
        assert_eq!(
            plan.moves[1].destination,
            temp_dir.path().join("text_plain").join("b.txt")
        );
        assert_eq!(plan.by_group.len(), 2);
        // Preview only
        assert!(temp_dir.path().join("a.pdf").exists());
    }

    #[test]
    fn plan_resolves_conflicts_between_planned_files() {
        let temp_dir = TempDir::new().unwrap();
        let left = temp_dir.path().join("left");
        let right = temp_dir.path().join("right");
        fs::create_dir(&left).unwrap();
        fs::create_dir(&right).unwrap();
        fs::write(left.join("notes.txt"), b"left").unwrap();
        fs::write(right.join("notes.txt"), b"right").unwrap();

        let plan = OrganizePlanner::create_plan(
            temp_dir.path(),
            &OrganizeConfig::default(),
            &MetadataExtractor::new(),
            &null_sender(),
        )
        .unwrap();

        let folder = temp_dir.path().join("text_plain");
        assert_eq!(plan.moves[0].destination, folder.join("notes.txt"));
        assert_eq!(plan.moves[1].destination, folder.join("notes_1.txt"));
        assert!(plan.moves[1].has_conflict);
        assert_eq!(plan.conflict_count, 1);
    }

    #[test]
    fn plan_leaves_files_already_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("text_plain");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("notes.txt"), b"sorted").unwrap();

        let plan = OrganizePlanner::create_plan(
            temp_dir.path(),
            &OrganizeConfig::default(),
            &MetadataExtractor::new(),
            &null_sender(),
        )
        .unwrap();

        assert!(plan.moves.is_empty());
        assert_eq!(plan.already_in_place, 1);
    }
}
