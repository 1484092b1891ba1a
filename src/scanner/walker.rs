//! Directory walker implementation using walkdir for sequential traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which traverses one or more
//! scan roots, applies the [`ScanFilter`] to every regular file, hashes the
//! files that pass and, when ZIP scanning is enabled, expands each `.zip`
//! file into its members.
//!
//! # Features
//!
//! - Deterministic order: directory entries are sorted by file name
//! - Symlinks are never followed
//! - Size (KB) and extension filtering
//! - Per-item hash failures are yielded as errors without stopping the walk
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{ScanFilter, ScanRoot, Walker};
//!
//! let walker = Walker::new(vec![ScanRoot::new("/home/user/Downloads")], ScanFilter::default());
//! let items: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Hashed {} items", items.len());
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{
    archive, extension_of, HashError, Hasher, LogicalPath, ScanError, ScanFilter, ScanItem,
    ScanRoot,
};

/// Sequential directory walker that hashes every file passing the filter.
#[derive(Debug)]
pub struct Walker {
    roots: Vec<ScanRoot>,
    filter: ScanFilter,
    hasher: Hasher,
    shutdown_flag: Option<Arc<AtomicBool>>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker over `roots`.
    #[must_use]
    pub fn new(roots: Vec<ScanRoot>, filter: ScanFilter) -> Self {
        Self {
            roots,
            filter,
            hasher: Hasher::new(),
            shutdown_flag: None,
            cancel_flag: None,
        }
    }

    /// Use a custom hasher (e.g. a different block size).
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops before the next
    /// directory entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set a per-scan cancel flag, checked alongside the shutdown flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// The roots this walker traverses.
    #[must_use]
    pub fn roots(&self) -> &[ScanRoot] {
        &self.roots
    }

    /// Check if shutdown or cancellation has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        [&self.shutdown_flag, &self.cancel_flag]
            .into_iter()
            .flatten()
            .any(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root in order, yielding hashed items.
    ///
    /// Per-item failures arrive as `Err(ScanError::Hash(_))` and the walk
    /// continues. Traversal failures (`ScanError::is_fatal`) are yielded too;
    /// it is up to the caller to stop on them.
    pub fn walk(&self) -> impl Iterator<Item = Result<ScanItem, ScanError>> + '_ {
        self.roots
            .iter()
            .flat_map(move |root| self.walk_root(root))
            .take_while(move |_| !self.is_shutdown_requested())
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a ScanRoot,
    ) -> Box<dyn Iterator<Item = Result<ScanItem, ScanError>> + 'a> {
        if let Err(e) = check_root(&root.path) {
            log::warn!("Cannot scan {}: {}", root.path.display(), e);
            return Box::new(std::iter::once(Err(e)));
        }

        log::debug!(
            "Walking {} (scan against self: {})",
            root.path.display(),
            root.scan_self
        );

        let entries = WalkDir::new(&root.path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Box::new(entries.flat_map(move |entry| match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    return Vec::new();
                }
                self.process_file(entry.path())
            }
            Err(e) => vec![Err(handle_walkdir_error(&root.path, e))],
        }))
    }

    /// Filter and hash one regular file, expanding ZIP members when enabled.
    fn process_file(&self, path: &Path) -> Vec<Result<ScanItem, ScanError>> {
        let size = match std::fs::symlink_metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::warn!("Cannot stat {}: {}", path.display(), e);
                return vec![Err(HashError::from_io(LogicalPath::from(path), e).into())];
            }
        };
        let extension = extension_of(path);

        if !self.filter.matches(size, &extension) {
            log::debug!(
                "Skipping file due to filter ({} bytes): {}",
                size,
                path.display()
            );
            return Vec::new();
        }

        let mut results = vec![self.hash_file(path, size)];

        // Members of an accepted archive are not filtered again.
        if self.filter.search_zip && extension == "zip" {
            results.extend(self.expand_archive(path));
        }

        results
    }

    fn hash_file(&self, path: &Path, size: u64) -> Result<ScanItem, ScanError> {
        match self.hasher.hash_file(path) {
            Ok(fingerprint) => Ok(ScanItem {
                path: LogicalPath::from(path),
                fingerprint,
                size,
            }),
            Err(e) => {
                log::warn!("Skipping unreadable file: {}", e);
                Err(e.into())
            }
        }
    }

    fn expand_archive(&self, path: &Path) -> Vec<Result<ScanItem, ScanError>> {
        let members = match archive::hash_members(path, &self.hasher) {
            Ok(members) => members,
            Err(e) => {
                log::warn!("Skipping unreadable archive: {}", e);
                return vec![Err(e.into())];
            }
        };

        log::debug!("Expanded {} entries from {}", members.len(), path.display());
        members
            .into_iter()
            .map(|member| member.map_err(ScanError::from))
            .collect()
    }
}

/// Verify a scan root exists and is a directory.
fn check_root(path: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(path.to_path_buf())),
        Err(e) => Err(handle_io_error(path, e)),
    }
}

/// Map an I/O error during traversal to a scan error.
fn handle_io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        _ => ScanError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Handle walkdir errors (unreadable directories, loops).
fn handle_walkdir_error(root: &Path, error: walkdir::Error) -> ScanError {
    let path = error.path().unwrap_or(root).to_path_buf();
    log::warn!("Walker error for {}: {}", path.display(), error);
    match error.into_io_error() {
        Some(io) => handle_io_error(&path, io),
        None => ScanError::Io {
            path,
            source: std::io::Error::other("filesystem loop detected"),
        },
    }
}
