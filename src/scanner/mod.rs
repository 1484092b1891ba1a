//! Scanner module for directory traversal and content hashing.
//!
//! This module provides functionality for:
//! - Sequential directory walking using walkdir
//! - Size and extension filtering
//! - SHA-256 content fingerprints for files and ZIP members
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal, filtering and emission of scan items
//! - [`hasher`]: Streaming SHA-256 hashing
//! - [`archive`]: ZIP member enumeration
//! - [`path`]: Logical paths for files and archive members
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{ScanFilter, ScanRoot, Walker};
//!
//! let filter = ScanFilter::default().with_search_zip(true);
//! let walker = Walker::new(vec![ScanRoot::new("/home/user/Downloads")], filter);
//! for item in walker.walk() {
//!     match item {
//!         Ok(item) => println!("{} {}", item.fingerprint, item.path),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod archive;
pub mod hasher;
pub mod path;
pub mod walker;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

pub use hasher::{Fingerprint, Hasher, BLOCK_SIZE};
pub use path::LogicalPath;
pub use walker::Walker;

/// A directory to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoot {
    /// Directory to walk recursively
    pub path: PathBuf,
    /// "Scan against self" flag. Recorded with the root but does not yet
    /// restrict grouping to cross-root duplicates.
    pub scan_self: bool,
}

impl ScanRoot {
    /// Root with the scan-against-self flag set.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scan_self: true,
        }
    }

    /// Set the scan-against-self flag.
    #[must_use]
    pub fn with_scan_self(mut self, scan_self: bool) -> Self {
        self.scan_self = scan_self;
        self
    }
}

/// One hashed item emitted by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanItem {
    /// File or archive member
    pub path: LogicalPath,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Size in bytes (uncompressed size for archive members)
    pub size: u64,
}

/// File size and extension filter applied before hashing.
///
/// Sizes are whole kilobytes (bytes / 1024, truncated) and both bounds are
/// inclusive. The allow-list is checked first (an empty list allows every
/// extension), then the deny-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    /// Minimum size in KB (inclusive)
    pub min_size_kb: u64,
    /// Maximum size in KB (inclusive)
    pub max_size_kb: u64,
    /// Extensions to include; empty means all
    pub extensions: BTreeSet<String>,
    /// Extensions to exclude
    pub skip_extensions: BTreeSet<String>,
    /// Also hash members of `.zip` files
    pub search_zip: bool,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            min_size_kb: 0,
            max_size_kb: u64::MAX,
            extensions: BTreeSet::new(),
            skip_extensions: BTreeSet::new(),
            search_zip: false,
        }
    }
}

impl ScanFilter {
    /// Build a filter from raw user-entered text fields.
    ///
    /// A missing or non-numeric minimum becomes 0 and a missing or
    /// non-numeric maximum becomes unbounded. Extension lists are
    /// comma-separated.
    ///
    /// # Example
    ///
    /// ```
    /// use dupesweep::scanner::ScanFilter;
    ///
    /// let filter = ScanFilter::from_raw(Some("abc"), None, Some("JPG, .png"), None, false);
    /// assert_eq!(filter.min_size_kb, 0);
    /// assert_eq!(filter.max_size_kb, u64::MAX);
    /// assert!(filter.extensions.contains("jpg"));
    /// assert!(filter.extensions.contains("png"));
    /// ```
    #[must_use]
    pub fn from_raw(
        min_size_kb: Option<&str>,
        max_size_kb: Option<&str>,
        extensions: Option<&str>,
        skip_extensions: Option<&str>,
        search_zip: bool,
    ) -> Self {
        Self {
            min_size_kb: parse_kb(min_size_kb).unwrap_or(0),
            max_size_kb: parse_kb(max_size_kb).unwrap_or(u64::MAX),
            extensions: parse_extension_list(extensions.unwrap_or_default()),
            skip_extensions: parse_extension_list(skip_extensions.unwrap_or_default()),
            search_zip,
        }
    }

    /// Set the size range in KB.
    #[must_use]
    pub fn with_size_range(mut self, min_size_kb: u64, max_size_kb: u64) -> Self {
        self.min_size_kb = min_size_kb;
        self.max_size_kb = max_size_kb;
        self
    }

    /// Set the extension allow-list.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    /// Set the extension deny-list.
    #[must_use]
    pub fn with_skip_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skip_extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    /// Enable or disable ZIP member scanning.
    #[must_use]
    pub fn with_search_zip(mut self, search_zip: bool) -> Self {
        self.search_zip = search_zip;
        self
    }

    /// Check the size range.
    #[must_use]
    pub fn passes_size_filter(&self, size_kb: u64) -> bool {
        self.min_size_kb <= size_kb && size_kb <= self.max_size_kb
    }

    /// Check the allow-list, then the deny-list.
    #[must_use]
    pub fn passes_extension_filter(&self, extension: &str) -> bool {
        if !self.extensions.is_empty() && !self.extensions.contains(extension) {
            return false;
        }
        !self.skip_extensions.contains(extension)
    }

    /// Apply all checks in order: size, allow-list, deny-list.
    #[must_use]
    pub fn matches(&self, size_bytes: u64, extension: &str) -> bool {
        self.passes_size_filter(size_kb(size_bytes)) && self.passes_extension_filter(extension)
    }
}

/// Whole kilobytes, truncated.
#[must_use]
pub fn size_kb(size_bytes: u64) -> u64 {
    size_bytes / 1024
}

/// Lowercase extension without the leading dot, empty if none.
#[must_use]
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn parse_kb(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}

fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_lowercase();
    (!ext.is_empty()).then_some(ext)
}

/// Parse a comma-separated extension list.
#[must_use]
pub fn parse_extension_list(raw: &str) -> BTreeSet<String> {
    raw.split(',').filter_map(normalize_extension).collect()
}

/// Errors that can occur during directory scanning.
///
/// Traversal failures abort the scan pass; [`ScanError::Hash`] wraps a
/// per-item failure that the scan skips over.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when reading a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while reading a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A single file or archive member could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Whether this error ends the scan pass.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Hash(_))
    }

    /// The directory, file or archive member the error is about.
    #[must_use]
    pub fn item(&self) -> String {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::NotADirectory(p) => {
                p.display().to_string()
            }
            Self::Io { path, .. } => path.display().to_string(),
            Self::Hash(e) => e.path().to_string(),
        }
    }
}

/// Errors that can occur while hashing a single item.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file or member was not found.
    #[error("File not found: {0}")]
    NotFound(LogicalPath),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(LogicalPath),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Item where the error occurred
        path: LogicalPath,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The archive or one of its entries is unreadable.
    #[error("Archive error for {path}: {source}")]
    Archive {
        /// Item where the error occurred
        path: LogicalPath,
        /// The underlying ZIP error
        #[source]
        source: zip::result::ZipError,
    },
}

impl HashError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: LogicalPath, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// The item that failed.
    #[must_use]
    pub fn path(&self) -> &LogicalPath {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } | Self::Archive { path, .. } => path,
        }
    }
}
