//! Remediation engine: applies a strategy to selected group members and
//! keeps the group table consistent.
//!
//! # Overview
//!
//! [`Remediator::remediate`] processes every selected path independently.
//! Archive members are always removed through the [`ArchiveTool`],
//! whatever the strategy. Every other path is handled by the strategy's
//! primitive from [`super::delete`]. A failed item is recorded and the batch
//! moves on; a successful item is removed from its group. Editing an archive
//! changes its content, so the archive file leaves its group too; a file
//! that is deleted or moved takes its tracked archive members with it. When
//! the batch is done, groups left with one member or fewer are dropped.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::{selection, RemediationStrategy, Remediator};
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupesweep::scanner::ScanRoot;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (mut result, _) = finder.find_duplicates(&[ScanRoot::new(".")]).unwrap();
//!
//! let selected = selection::all_but_first(&result);
//! let report = Remediator::default()
//!     .remediate(&RemediationStrategy::TrashMove, &mut result, &selected)
//!     .unwrap();
//! println!("{}", report.summary());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytesize::ByteSize;

use super::archive::ArchiveTool;
use super::delete::{
    delete_to_trash, permanent_delete, relocate_file, replace_with_hardlink, RemediationAction,
    RemediationError, RemediationOutcome,
};
use crate::duplicates::{DuplicateGroup, ScanResult};
use crate::progress::{ProgressCallback, PHASE_REMEDIATING};
use crate::scanner::LogicalPath;

/// How selected duplicates are dealt with. Exactly one strategy applies per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationStrategy {
    /// Remove the file; not recoverable.
    PermanentDelete,
    /// Move the file to the platform trash.
    TrashMove,
    /// Move the file into a consolidation folder, keeping its name.
    RelocateToFolder {
        /// Consolidation folder, created if absent
        destination: PathBuf,
    },
    /// Replace the file with a hard link to the group's retained copy.
    HardlinkReplace,
}

impl RemediationStrategy {
    /// Short name for logs and reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PermanentDelete => "delete",
            Self::TrashMove => "trash",
            Self::RelocateToFolder { .. } => "move",
            Self::HardlinkReplace => "hardlink",
        }
    }

    /// Check the strategy's parameters before anything is touched.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `RelocateToFolder` has an empty destination.
    pub fn validate(&self) -> Result<(), RemediationError> {
        match self {
            Self::RelocateToFolder { destination } if destination.as_os_str().is_empty() => Err(
                RemediationError::Configuration("a destination folder is required".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RemediationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelocateToFolder { destination } => {
                write!(f, "move to {}", destination.display())
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Per-item results of one remediation batch.
#[derive(Debug, Default)]
pub struct RemediationReport {
    /// Successfully remediated items.
    pub successes: Vec<RemediationOutcome>,
    /// Failed items with their errors.
    pub failures: Vec<(LogicalPath, RemediationError)>,
    /// Bytes freed by deletions and hard links.
    pub bytes_reclaimed: u64,
    /// Groups that stopped being duplicates and were dropped.
    pub groups_dropped: usize,
}

impl RemediationReport {
    /// Number of successful items.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted items.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all items succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the batch.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize::b(self.bytes_reclaimed);
        if self.all_succeeded() {
            format!(
                "Remediated {} item(s), freed {}, {} group(s) resolved",
                self.success_count(),
                freed,
                self.groups_dropped
            )
        } else {
            format!(
                "Remediated {} item(s), {} failed, freed {}, {} group(s) resolved",
                self.success_count(),
                self.failure_count(),
                freed,
                self.groups_dropped
            )
        }
    }

    fn record(&mut self, path: &LogicalPath, result: Result<RemediationOutcome, RemediationError>) {
        match result {
            Ok(outcome) => {
                if outcome.action.reclaims_space() {
                    self.bytes_reclaimed += outcome.size;
                }
                self.successes.push(outcome);
            }
            Err(e) => {
                log::warn!("Remediation failed for {}: {}", path, e);
                self.failures.push((path.clone(), e));
            }
        }
    }
}

/// Applies remediation strategies to a [`ScanResult`].
#[derive(Default)]
pub struct Remediator {
    archive_tool: ArchiveTool,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for Remediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remediator")
            .field("archive_tool", &self.archive_tool)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Remediator {
    /// Create a remediator using `archive_tool` for archive members.
    #[must_use]
    pub fn new(archive_tool: ArchiveTool) -> Self {
        Self {
            archive_tool,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The archive tool in use.
    #[must_use]
    pub fn archive_tool(&self) -> &ArchiveTool {
        &self.archive_tool
    }

    /// Apply `strategy` to every path in `selected` and update `result`.
    ///
    /// Repeated paths are processed once. On return no group in `result`
    /// has fewer than two members.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` (with nothing touched) if the strategy's
    /// parameters are invalid. Per-item failures are in the report instead.
    pub fn remediate(
        &self,
        strategy: &RemediationStrategy,
        result: &mut ScanResult,
        selected: &[LogicalPath],
    ) -> Result<RemediationReport, RemediationError> {
        strategy.validate()?;

        let mut seen = HashSet::new();
        let selected: Vec<&LogicalPath> = selected.iter().filter(|p| seen.insert(*p)).collect();
        let selected_set: HashSet<&LogicalPath> = selected.iter().copied().collect();
        let edited_archives: HashSet<&Path> = selected
            .iter()
            .copied()
            .filter(|p| p.is_archive_member())
            .map(LogicalPath::physical_path)
            .collect();

        log::info!(
            "Remediating {} item(s) with strategy: {}",
            selected.len(),
            strategy
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_REMEDIATING, selected.len());
        }

        let mut report = RemediationReport::default();

        for (index, path) in selected.iter().enumerate() {
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(index + 1, &path.to_string());
            }

            let outcome = match result.locate(path) {
                None => Err(RemediationError::NotTracked((*path).clone())),
                Some(group) => {
                    self.remediate_item(strategy, group, path, &selected_set, &edited_archives)
                }
            };

            if let Ok(ref done) = outcome {
                result.remove_path(path);
                untrack_affected(result, path, &done.action);
            }
            report.record(path, outcome);
        }

        report.groups_dropped = result.drop_singletons();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_REMEDIATING);
        }

        log::info!("{}", report.summary());

        Ok(report)
    }

    fn remediate_item(
        &self,
        strategy: &RemediationStrategy,
        group: &DuplicateGroup,
        path: &LogicalPath,
        selected: &HashSet<&LogicalPath>,
        edited_archives: &HashSet<&Path>,
    ) -> Result<RemediationOutcome, RemediationError> {
        if *strategy == RemediationStrategy::HardlinkReplace
            && group.members.iter().all(|m| selected.contains(&m.path))
        {
            return Err(RemediationError::AllMembersSelected {
                group: group.id,
                path: path.clone(),
            });
        }

        let file = match path {
            LogicalPath::ArchiveMember { archive, member } => {
                return self.archive_tool.delete_member(archive, member);
            }
            LogicalPath::File(file) => file,
        };

        match strategy {
            RemediationStrategy::PermanentDelete => permanent_delete(file),
            RemediationStrategy::TrashMove => delete_to_trash(file),
            RemediationStrategy::RelocateToFolder { destination } => {
                relocate_file(file, destination)
            }
            RemediationStrategy::HardlinkReplace => {
                let primary =
                    hardlink_primary(group, selected, edited_archives).ok_or_else(|| {
                        RemediationError::Link {
                            path: path.clone(),
                            source: std::io::Error::other(
                                "no unselected regular file to link to in this group",
                            ),
                        }
                    })?;
                replace_with_hardlink(file, primary)
            }
        }
    }
}

/// First member of `group`, in group order, that is not selected and can be
/// linked to. Archive members cannot, and neither can an archive this batch
/// is editing.
fn hardlink_primary<'a>(
    group: &'a DuplicateGroup,
    selected: &HashSet<&LogicalPath>,
    edited_archives: &HashSet<&Path>,
) -> Option<&'a Path> {
    group
        .members
        .iter()
        .filter(|m| !selected.contains(&m.path))
        .filter_map(|m| m.path.as_file())
        .find(|file| !edited_archives.contains(file))
}

/// Drop table entries that no longer describe what is on disk after `path`
/// was remediated with `action`.
fn untrack_affected(result: &mut ScanResult, path: &LogicalPath, action: &RemediationAction) {
    match (path, action) {
        (LogicalPath::ArchiveMember { archive, .. }, RemediationAction::MemberDeleted) => {
            if result.remove_path(&LogicalPath::file(archive)).is_some() {
                log::debug!("Archive {} changed; no longer tracked", archive.display());
            }
        }
        (
            LogicalPath::File(file),
            RemediationAction::Deleted | RemediationAction::Trashed | RemediationAction::Relocated(_),
        ) => {
            let removed = result.remove_archive_members(file);
            if removed > 0 {
                log::debug!(
                    "{} member(s) of {} no longer tracked",
                    removed,
                    file.display()
                );
            }
        }
        _ => {}
    }
}
