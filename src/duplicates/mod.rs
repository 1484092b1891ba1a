//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping scanned items by content fingerprint
//! - The live duplicate group table mutated by remediation
//! - Running a complete scan pass over a set of roots

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{group_by_fingerprint, DuplicateGroup, GroupMember, ScanResult};
