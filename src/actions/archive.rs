//! Deletion of members inside ZIP archives via an external archive tool.
//!
//! The archive is edited in place by running `<tool> d -- <archive> <member>`
//! (the 7-Zip command line syntax; `--` keeps a member named `-x` from being
//! read as a switch). A missing tool or a non-zero exit status
//! is reported for the single member and never aborts a batch.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::delete::{RemediationAction, RemediationError, RemediationOutcome};
use crate::scanner::{archive, HashError, LogicalPath};

/// Default archive tool program name, looked up on `PATH`.
pub const DEFAULT_ARCHIVE_TOOL: &str = "7z";

/// External command used to delete archive members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTool {
    program: PathBuf,
}

impl Default for ArchiveTool {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_TOOL)
    }
}

impl ArchiveTool {
    /// Use `program` as the archive tool.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check whether the tool can be started at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.program).output().is_ok()
    }

    /// Remove `member` from `archive_path` in place.
    ///
    /// # Errors
    ///
    /// - `StaleArchiveMember` if the archive or member no longer exists
    /// - `ExternalTool` if the tool is missing or exits with an error
    pub fn delete_member(
        &self,
        archive_path: &Path,
        member: &str,
    ) -> Result<RemediationOutcome, RemediationError> {
        let logical = LogicalPath::archive_member(archive_path, member);

        let size = match archive::member_size(archive_path, member) {
            Ok(size) => size,
            Err(HashError::NotFound(_)) => {
                log::warn!("Archive member no longer exists: {}", logical);
                return Err(RemediationError::StaleArchiveMember(logical));
            }
            Err(e) => {
                return Err(RemediationError::Io {
                    path: logical,
                    source: io::Error::other(e.to_string()),
                })
            }
        };

        log::debug!(
            "Running {} d -- {} {}",
            self.program.display(),
            archive_path.display(),
            member
        );

        let output = Command::new(&self.program)
            .arg("d")
            .arg("--")
            .arg(archive_path)
            .arg(member)
            .output()
            .map_err(|e| {
                let message = if e.kind() == io::ErrorKind::NotFound {
                    format!("archive tool not found: {}", self.program.display())
                } else {
                    format!("failed to run {}: {}", self.program.display(), e)
                };
                log::error!("{}", message);
                RemediationError::ExternalTool {
                    path: logical.clone(),
                    message,
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program.display(), output.status)
            } else {
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr
                )
            };
            log::error!("Archive member deletion failed for {}: {}", logical, message);
            return Err(RemediationError::ExternalTool {
                path: logical,
                message,
            });
        }

        log::info!("Deleted archive member: {} ({} bytes)", logical, size);

        Ok(RemediationOutcome::new(
            logical,
            size,
            RemediationAction::MemberDeleted,
        ))
    }
}
