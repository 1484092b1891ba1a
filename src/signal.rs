//! Ctrl+C handling for scans.
//!
//! A single `AtomicBool` is raised when the user interrupts the program.
//! The flag is handed to the [`Orchestrator`](crate::orchestrator::Orchestrator),
//! which passes it on to every scan task; a raised flag stops the walk and
//! the scan's result is discarded. Remediation batches do not look at it.
//!
//! ```rust,no_run
//! use dupesweep::orchestrator::Orchestrator;
//! use dupesweep::scanner::ScanFilter;
//! use dupesweep::signal::install_handler;
//!
//! let handler = install_handler();
//! let orchestrator = Orchestrator::new(ScanFilter::default())
//!     .with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption: 128 + 2.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag manually.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// A clone of the flag for scan tasks.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook and return its handler.
///
/// The hook is installed once per process. Later calls return the same
/// handler with its flag lowered. If another component already owns the
/// Ctrl+C hook, the returned handler only reacts to
/// [`ShutdownHandler::request_shutdown`].
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.get_flag();

        if let Err(e) = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);

            let _ = writeln!(std::io::stderr(), "\nInterrupted. Discarding scan...");
            let _ = std::io::stderr().flush();

            log::info!("Shutdown signal received");
        }) {
            log::debug!("Ctrl+C handler not installed: {}", e);
        }

        handler
    });

    handler.reset();
    handler.clone()
}
