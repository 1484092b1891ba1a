//! Duplicate finder: one scan pass from roots to a grouped result.
//!
//! # Overview
//!
//! The [`DuplicateFinder`] drives the [`Walker`] over every root, collects
//! the hashed items, and hands them to [`group_by_fingerprint`]. Per-item
//! hash failures are recorded in the [`ScanSummary`] and the pass continues;
//! a traversal failure (missing root, unreadable directory) aborts the pass.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupesweep::scanner::{ScanFilter, ScanRoot};
//!
//! let config = FinderConfig::default().with_filter(ScanFilter::default().with_search_zip(true));
//! let finder = DuplicateFinder::new(config);
//!
//! let (result, summary) = finder.find_duplicates(&[ScanRoot::new("/some/path")]).unwrap();
//! println!("Found {} duplicate groups", result.group_count());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::groups::{group_by_fingerprint, ScanResult};
use crate::progress::{ProgressCallback, PHASE_SCANNING};
use crate::scanner::{Hasher, ScanError, ScanFilter, ScanRoot, Walker};

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Size, extension and ZIP options for the walk.
    pub filter: ScanFilter,
    /// Hasher used for files and archive members.
    pub hasher: Hasher,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional flag that cancels this scan only.
    pub cancel_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("filter", &self.filter)
            .field("hasher", &self.hasher)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("cancel_flag", &self.cancel_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the scan filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set a flag that cancels this scan without touching the shutdown flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown or cancellation has been requested.
    fn is_shutdown_requested(&self) -> bool {
        [&self.shutdown_flag, &self.cancel_flag]
            .into_iter()
            .flatten()
            .any(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of files and archive members hashed
    pub total_files: usize,
    /// Total size of everything hashed, in bytes
    pub total_size: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding the first of each group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Items that could not be hashed
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Whether some items were skipped because they could not be read.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was not started because its input is incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The scan was interrupted (Ctrl+C or cancellation).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A traversal error aborted the scan pass.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Duplicate finder that runs a full scan pass.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan `roots` and group everything found by content.
    ///
    /// An empty root list yields an empty result without touching the
    /// filesystem.
    ///
    /// # Errors
    ///
    /// - `Interrupted` if the shutdown flag is raised before the pass completes
    /// - `Scan` if a root is missing or a directory cannot be read
    pub fn find_duplicates(
        &self,
        roots: &[ScanRoot],
    ) -> Result<(ScanResult, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if roots.is_empty() {
            log::warn!("No directories to scan");
            return Ok((ScanResult::default(), summary));
        }

        log::info!(
            "Starting duplicate scan of {} director{}",
            roots.len(),
            if roots.len() == 1 { "y" } else { "ies" }
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut walker = Walker::new(roots.to_vec(), self.config.filter.clone())
            .with_hasher(self.config.hasher.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref flag) = self.config.cancel_flag {
            walker = walker.with_cancel_flag(flag.clone());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_SCANNING, 0);
        }

        let mut items = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(item) => {
                    summary.total_files += 1;
                    summary.total_size += item.size;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(summary.total_files, &item.path.to_string());
                        callback.on_item_completed(item.size);
                    }
                    items.push(item);
                }
                Err(e) if e.is_fatal() => {
                    log::error!("Scan aborted: {}", e);
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_phase_end(PHASE_SCANNING);
                    }
                    return Err(FinderError::Scan(e));
                }
                Err(e) => summary.scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_SCANNING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Scan interrupted after {} items", summary.total_files);
            return Err(FinderError::Interrupted);
        }

        let result = group_by_fingerprint(items);

        summary.duplicate_groups = result.group_count();
        summary.duplicate_files = result
            .groups()
            .iter()
            .map(super::DuplicateGroup::duplicate_count)
            .sum();
        summary.reclaimable_space = result.reclaimable_bytes();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} items hashed, {} groups, {} reclaimable ({} skipped) in {:.2?}",
            summary.total_files,
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.scan_errors.len(),
            summary.scan_duration
        );

        Ok((result, summary))
    }
}
