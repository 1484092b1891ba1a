//! Remediation actions module.
//!
//! This module provides functionality for:
//! - Permanent deletion, trash, relocation and hard-link replacement of files
//! - Deleting members inside ZIP archives through an external tool
//! - The remediation engine that keeps the group table consistent
//! - Selection helpers that pick which duplicates to act on
//!
//! ```no_run
//! use dupesweep::actions::delete::delete_to_trash;
//! use std::path::Path;
//!
//! let result = delete_to_trash(Path::new("/path/to/duplicate.txt"));
//! ```

pub mod archive;
pub mod delete;
pub mod remediate;
pub mod selection;

// Re-export commonly used types
pub use archive::{ArchiveTool, DEFAULT_ARCHIVE_TOOL};
pub use delete::{
    delete_to_trash, permanent_delete, relocate_file, replace_with_hardlink, RemediationAction,
    RemediationError, RemediationOutcome,
};
pub use remediate::{RemediationReport, RemediationStrategy, Remediator};
