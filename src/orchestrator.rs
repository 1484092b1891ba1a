//! Scan orchestration: background scans, the published result, and
//! remediation requests against it.
//!
//! # Overview
//!
//! The [`Orchestrator`] owns the current [`ScanResult`]. A scan is started
//! with [`Orchestrator::start_scan`], which runs the [`DuplicateFinder`] on a
//! background thread and hands back a [`ScanTask`]. The caller polls or
//! waits on the task and publishes a completed result. Cancelling a task
//! discards whatever it produces; nothing partial is ever published.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::RemediationStrategy;
//! use dupesweep::orchestrator::Orchestrator;
//! use dupesweep::scanner::{ScanFilter, ScanRoot};
//!
//! let mut orchestrator = Orchestrator::new(ScanFilter::default());
//! let stats = orchestrator.scan(vec![ScanRoot::new("/data")]).unwrap();
//! println!("{}", stats);
//!
//! let selected = dupesweep::actions::selection::all_but_first(orchestrator.result());
//! let report = orchestrator
//!     .remediate(&RemediationStrategy::TrashMove, &selected)
//!     .unwrap();
//! println!("{}", report.summary());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytesize::ByteSize;

use crate::actions::{RemediationError, RemediationReport, RemediationStrategy, Remediator};
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError, ScanResult, ScanSummary};
use crate::progress::ProgressCallback;
use crate::scanner::{LogicalPath, ScanFilter, ScanRoot};

type ScanOutcome = Result<(ScanResult, ScanSummary), FinderError>;

/// Aggregate counts over the published result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files tracked across all groups
    pub total_files: usize,
    /// Number of duplicate groups
    pub group_count: usize,
    /// Bytes freed if every group kept only its first member
    pub reclaimable_bytes: u64,
}

impl ScanStats {
    /// Compute the counts for `result`.
    #[must_use]
    pub fn of(result: &ScanResult) -> Self {
        Self {
            total_files: result.total_files(),
            group_count: result.group_count(),
            reclaimable_bytes: result.reclaimable_bytes(),
        }
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total files: {}, duplicate groups: {}, space to be freed: {}",
            self.total_files,
            self.group_count,
            ByteSize::b(self.reclaimable_bytes)
        )
    }
}

/// Handle to a scan running on a background thread.
pub struct ScanTask {
    receiver: Receiver<ScanOutcome>,
    handle: Option<JoinHandle<()>>,
    cancel_flag: Arc<AtomicBool>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl fmt::Debug for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanTask")
            .field("running", &self.handle.as_ref().is_some_and(|h| !h.is_finished()))
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl ScanTask {
    /// Abandon the scan. Its result, when it arrives, is discarded.
    ///
    /// Only this task is affected; later scans start normally.
    pub fn cancel(&self) {
        log::info!("Scan cancelled");
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) was called (or the shared flag raised).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
            || self
                .shutdown_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Poll for completion without blocking.
    ///
    /// Returns `None` while the scan is still running.
    pub fn try_result(&mut self) -> Option<ScanOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.join();
                Some(self.filter_cancelled(outcome))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(FinderError::Interrupted))
            }
        }
    }

    /// Block until the scan completes.
    ///
    /// # Errors
    ///
    /// Returns the finder's error, or `Interrupted` if the task was cancelled.
    pub fn wait(mut self) -> ScanOutcome {
        let outcome = self
            .receiver
            .recv()
            .unwrap_or(Err(FinderError::Interrupted));
        self.join();
        self.filter_cancelled(outcome)
    }

    fn filter_cancelled(&self, outcome: ScanOutcome) -> ScanOutcome {
        if self.is_cancelled() {
            log::debug!("Discarding result of cancelled scan");
            Err(FinderError::Interrupted)
        } else {
            outcome
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Scan thread panicked");
            }
        }
    }
}

/// Owns the published scan result and mediates every change to it.
pub struct Orchestrator {
    filter: ScanFilter,
    remediator: Remediator,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
    result: ScanResult,
    stats: ScanStats,
    last_summary: Option<ScanSummary>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("filter", &self.filter)
            .field("remediator", &self.remediator)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator with an empty published result.
    #[must_use]
    pub fn new(filter: ScanFilter) -> Self {
        Self {
            filter,
            remediator: Remediator::default(),
            shutdown_flag: None,
            progress_callback: None,
            result: ScanResult::default(),
            stats: ScanStats::default(),
            last_summary: None,
        }
    }

    /// Use a configured remediator (e.g. a custom archive tool).
    #[must_use]
    pub fn with_remediator(mut self, remediator: Remediator) -> Self {
        self.remediator = remediator;
        self
    }

    /// Share a shutdown flag (Ctrl+C) with every scan task.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Report scan progress to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The scan filter used for new scans.
    #[must_use]
    pub fn filter(&self) -> &ScanFilter {
        &self.filter
    }

    /// Replace the scan filter for subsequent scans.
    pub fn set_filter(&mut self, filter: ScanFilter) {
        self.filter = filter;
    }

    /// The currently published result.
    #[must_use]
    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    /// Summary of the last scan completed by [`scan`](Self::scan), including
    /// the items it could not read.
    #[must_use]
    pub fn last_summary(&self) -> Option<&ScanSummary> {
        self.last_summary.as_ref()
    }

    /// Counts over the currently published result.
    #[must_use]
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Start a scan of `roots` on a background thread.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` without starting anything if `roots` is empty.
    pub fn start_scan(&self, roots: Vec<ScanRoot>) -> Result<ScanTask, FinderError> {
        if roots.is_empty() {
            log::warn!("No directories selected; nothing to scan");
            return Err(FinderError::Configuration(
                "at least one directory must be selected".to_string(),
            ));
        }

        let cancel_flag = Arc::new(AtomicBool::new(false));

        let mut config = FinderConfig::default()
            .with_filter(self.filter.clone())
            .with_cancel_flag(cancel_flag.clone());
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(callback.clone());
        }

        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let finder = DuplicateFinder::new(config);
            let outcome = finder.find_duplicates(&roots);
            // The receiver may be gone if the task was dropped.
            let _ = tx.send(outcome);
        });

        Ok(ScanTask {
            receiver: rx,
            handle: Some(handle),
            cancel_flag,
            shutdown_flag: self.shutdown_flag.clone(),
        })
    }

    /// Replace the published result and recompute the counts.
    pub fn publish(&mut self, result: ScanResult) -> ScanStats {
        self.result = result;
        self.stats = ScanStats::of(&self.result);
        log::info!("{}", self.stats);
        self.stats
    }

    /// Run a scan to completion and publish it.
    ///
    /// Items the scan could not read are kept in
    /// [`last_summary`](Self::last_summary).
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an empty root list, `Interrupted` if the
    /// scan was stopped, or the traversal error that aborted it. The
    /// previously published result is kept on error.
    pub fn scan(&mut self, roots: Vec<ScanRoot>) -> Result<ScanStats, FinderError> {
        let (result, summary) = self.start_scan(roots)?.wait()?;
        for error in &summary.scan_errors {
            log::warn!("Skipped {}: {}", error.item(), error);
        }
        self.last_summary = Some(summary);
        Ok(self.publish(result))
    }

    /// Apply `strategy` to `selected` in the published result and re-publish it.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the strategy's parameters are invalid; the
    /// published result is untouched in that case.
    pub fn remediate(
        &mut self,
        strategy: &RemediationStrategy,
        selected: &[LogicalPath],
    ) -> Result<RemediationReport, RemediationError> {
        let report = self
            .remediator
            .remediate(strategy, &mut self.result, selected)?;
        self.stats = ScanStats::of(&self.result);
        log::info!("{}", self.stats);
        Ok(report)
    }
}
