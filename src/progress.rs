//! Terminal progress reporting with indicatif.
//!
//! Two phases report progress: `"scanning"` (an open-ended spinner, the
//! number of hashed items is not known up front) and `"remediating"` (a bar
//! over the selection).

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Phase name used while walking and hashing.
pub const PHASE_SCANNING: &str = "scanning";
/// Phase name used while applying a remediation strategy.
pub const PHASE_REMEDIATING: &str = "remediating";

/// Receives progress updates from scans and remediation batches.
///
/// Callbacks are invoked from the thread doing the work, which for
/// background scans is not the caller's thread.
pub trait ProgressCallback: Send + Sync {
    /// A phase begins. `total` is 0 when the item count is unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// `current` items (1-based) are done; `path` is the latest one.
    fn on_progress(&self, current: usize, path: &str);

    /// Size of the item that just completed.
    fn on_item_completed(&self, _bytes: u64) {}

    /// The phase finished or was abandoned.
    fn on_phase_end(&self, phase: &str);

    /// Free-form status text.
    fn on_message(&self, _message: &str) {}
}

/// indicatif-backed [`ProgressCallback`].
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    bytes: Mutex<u64>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter. A quiet reporter draws nothing.
    ///
    /// ```
    /// use dupesweep::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            bytes: Mutex::new(0),
            quiet,
        }
    }

    fn scanning_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{elapsed_precise}] {pos} items, {prefix}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn remediating_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if phase == PHASE_SCANNING || total == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::scanning_style());
            pb.set_prefix(bytesize::ByteSize(0).to_string());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::remediating_style());
            pb
        };
        pb.set_message(match phase {
            PHASE_SCANNING => "Scanning".to_string(),
            PHASE_REMEDIATING => "Remediating".to_string(),
            other => other.to_string(),
        });

        if let Ok(mut bytes) = self.bytes.lock() {
            *bytes = 0;
        }
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(previous) = guard.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 40));
        });
    }

    fn on_item_completed(&self, bytes: u64) {
        if self.quiet {
            return;
        }
        let total = match self.bytes.lock() {
            Ok(mut total) => {
                *total += bytes;
                *total
            }
            Err(_) => return,
        };
        self.with_bar(|pb| pb.set_prefix(bytesize::ByteSize(total).to_string()));
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_with_message(format!("{} complete", capitalize(phase)));
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|pb| pb.set_message(message.to_string()));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Shorten a path to at most `max_len` characters, keeping the file name.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let name = path
        .rsplit(['/', '\\', '#'])
        .next()
        .unwrap_or(path)
        .to_string();
    let name_len = name.chars().count();

    if name_len + 4 > max_len {
        let tail: String = name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{}", tail);
    }

    format!(".../{}", name)
}
