//! Filesystem primitives behind the remediation strategies.
//!
//! # Overview
//!
//! Each function acts on a single regular file and reports either a
//! [`RemediationOutcome`] or a [`RemediationError`] carrying the offending
//! path:
//! - [`permanent_delete`]: remove the file (irreversible)
//! - [`delete_to_trash`]: move the file to the platform trash
//! - [`relocate_file`]: move the file into a consolidation folder
//! - [`replace_with_hardlink`]: replace the file with a hard link to another copy
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::delete_to_trash;
//! use std::path::Path;
//!
//! match delete_to_trash(Path::new("/path/to/duplicate.txt")) {
//!     Ok(outcome) => println!("Moved to trash: {}", outcome.path),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::LogicalPath;

/// Error type for remediation operations.
#[derive(Debug, Error)]
pub enum RemediationError {
    /// The batch cannot run with the given parameters; nothing was touched.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(LogicalPath),

    /// Permission denied when attempting the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(LogicalPath),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    Trash {
        /// File that could not be trashed
        path: LogicalPath,
        /// Error reported by the trash backend
        message: String,
    },

    /// Hard link creation failed (cross-device, permission).
    #[error("hard link failed for {path}: {source}")]
    Link {
        /// File that was to be replaced
        path: LogicalPath,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The archive tool is missing or exited with an error.
    #[error("archive tool failed for {path}: {message}")]
    ExternalTool {
        /// Archive member that was to be deleted
        path: LogicalPath,
        /// Description of the failure
        message: String,
    },

    /// Every member of the group was selected, leaving nothing to keep.
    #[error("all members of group {group} are selected; skipping {path}")]
    AllMembersSelected {
        /// Group identifier
        group: usize,
        /// Selected member
        path: LogicalPath,
    },

    /// The path is not part of any duplicate group.
    #[error("not part of any duplicate group: {0}")]
    NotTracked(LogicalPath),

    /// The archive or member no longer exists.
    #[error("archive member no longer exists: {0}")]
    StaleArchiveMember(LogicalPath),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: LogicalPath,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl RemediationError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&LogicalPath> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotTracked(p)
            | Self::StaleArchiveMember(p)
            | Self::Trash { path: p, .. }
            | Self::Link { path: p, .. }
            | Self::ExternalTool { path: p, .. }
            | Self::AllMembersSelected { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::Configuration(_) => None,
        }
    }

    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        let path = LogicalPath::from(path);
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// What happened to a successfully remediated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationAction {
    /// Removed from the filesystem.
    Deleted,
    /// Moved to the platform trash.
    Trashed,
    /// Moved to the given location.
    Relocated(PathBuf),
    /// Replaced by a hard link to the given primary.
    Hardlinked(PathBuf),
    /// Removed from its archive by the archive tool.
    MemberDeleted,
}

impl RemediationAction {
    /// Whether the action frees space in the scanned locations' filesystem.
    #[must_use]
    pub fn reclaims_space(&self) -> bool {
        !matches!(self, Self::Relocated(_))
    }
}

impl std::fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::Trashed => f.write_str("trashed"),
            Self::Relocated(to) => write!(f, "moved to {}", to.display()),
            Self::Hardlinked(primary) => write!(f, "linked to {}", primary.display()),
            Self::MemberDeleted => f.write_str("removed from archive"),
        }
    }
}

/// Result of a successful remediation of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationOutcome {
    /// Item that was remediated.
    pub path: LogicalPath,
    /// Size of the item in bytes.
    pub size: u64,
    /// What was done.
    pub action: RemediationAction,
}

impl RemediationOutcome {
    /// Create a new outcome.
    #[must_use]
    pub fn new(path: LogicalPath, size: u64, action: RemediationAction) -> Self {
        Self { path, size, action }
    }
}

fn file_size(path: &Path) -> Result<u64, RemediationError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| RemediationError::from_io(path, e))
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be accessed
/// - `Trash` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<RemediationOutcome, RemediationError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        RemediationError::Trash {
            path: LogicalPath::from(path),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(RemediationOutcome::new(
        LogicalPath::from(path),
        size,
        RemediationAction::Trashed,
    ))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<RemediationOutcome, RemediationError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        RemediationError::from_io(path, e)
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(RemediationOutcome::new(
        LogicalPath::from(path),
        size,
        RemediationAction::Deleted,
    ))
}

/// Move a file into `destination`, keeping its base name.
///
/// The destination folder is created if absent. An existing file with the
/// same name is never overwritten. Moves across filesystems fall back to
/// copy and remove.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` for the source
/// - `Io` with kind `AlreadyExists` on a name collision
/// - `Io` if the destination cannot be created or written
pub fn relocate_file(
    path: &Path,
    destination: &Path,
) -> Result<RemediationOutcome, RemediationError> {
    let size = file_size(path)?;

    let file_name = path.file_name().ok_or_else(|| RemediationError::Io {
        path: LogicalPath::from(path),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;

    fs::create_dir_all(destination).map_err(|e| RemediationError::Io {
        path: LogicalPath::from(destination),
        source: e,
    })?;

    let target = destination.join(file_name);
    if fs::symlink_metadata(&target).is_ok() {
        return Err(RemediationError::Io {
            path: LogicalPath::from(path),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            ),
        });
    }

    match fs::rename(path, &target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "Cross-device move, copying {} to {}",
                path.display(),
                target.display()
            );
            fs::copy(path, &target).map_err(|e| RemediationError::from_io(path, e))?;
            fs::remove_file(path).map_err(|e| RemediationError::from_io(path, e))?;
        }
        Err(e) => return Err(RemediationError::from_io(path, e)),
    }

    log::info!("Relocated: {} -> {}", path.display(), target.display());

    Ok(RemediationOutcome::new(
        LogicalPath::from(path),
        size,
        RemediationAction::Relocated(target),
    ))
}

/// Replace `path` with a hard link to `primary`.
///
/// The link is first created under a temporary name next to `path` and then
/// renamed over it, so a failed link leaves the original file in place.
///
/// # Errors
///
/// - `NotFound` if either file is missing
/// - `Link` if the hard link cannot be created (e.g. different devices)
/// - `Io` if the final rename fails
pub fn replace_with_hardlink(
    path: &Path,
    primary: &Path,
) -> Result<RemediationOutcome, RemediationError> {
    let size = file_size(path)?;
    file_size(primary)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.dupesweep-link"));

    fs::hard_link(primary, &temp).map_err(|e| {
        log::error!(
            "Hard link {} -> {} failed: {}",
            path.display(),
            primary.display(),
            e
        );
        RemediationError::Link {
            path: LogicalPath::from(path),
            source: e,
        }
    })?;

    if let Err(e) = fs::rename(&temp, path) {
        if let Err(cleanup) = fs::remove_file(&temp) {
            log::warn!("Could not remove {}: {}", temp.display(), cleanup);
        }
        return Err(RemediationError::from_io(path, e));
    }

    log::info!(
        "Replaced with hard link: {} -> {}",
        path.display(),
        primary.display()
    );

    Ok(RemediationOutcome::new(
        LogicalPath::from(path),
        size,
        RemediationAction::Hardlinked(primary.to_path_buf()),
    ))
}
