//! Helpers that build a remediation selection from the group table.
//!
//! Each helper returns paths in group order, then member order, so the
//! selection is stable for a given [`ScanResult`].

use std::path::Path;

use crate::duplicates::ScanResult;
use crate::scanner::LogicalPath;

/// Every member except the first of each group.
#[must_use]
pub fn all_but_first(result: &ScanResult) -> Vec<LogicalPath> {
    result
        .groups()
        .iter()
        .flat_map(|g| g.members.iter().skip(1))
        .map(|m| m.path.clone())
        .collect()
}

/// Every member whose containing folder is exactly `dir`.
///
/// For archive members the folder is the archive reference, e.g.
/// `/data/x.zip#docs`.
#[must_use]
pub fn in_folder(result: &ScanResult, dir: &Path) -> Vec<LogicalPath> {
    result
        .groups()
        .iter()
        .flat_map(|g| g.members.iter())
        .filter(|m| Path::new(&m.folder()) == dir)
        .map(|m| m.path.clone())
        .collect()
}

/// Copies duplicated elsewhere: in every group that has a member in `dir`,
/// the members whose folder is not `dir`.
#[must_use]
pub fn outside_folder(result: &ScanResult, dir: &Path) -> Vec<LogicalPath> {
    result
        .groups()
        .iter()
        .filter(|g| g.members.iter().any(|m| Path::new(&m.folder()) == dir))
        .flat_map(|g| g.members.iter())
        .filter(|m| Path::new(&m.folder()) != dir)
        .map(|m| m.path.clone())
        .collect()
}

/// Every member stored under `prefix` (archive members by their archive's location).
#[must_use]
pub fn under_prefix(result: &ScanResult, prefix: &Path) -> Vec<LogicalPath> {
    result
        .groups()
        .iter()
        .flat_map(|g| g.members.iter())
        .filter(|m| m.path.physical_path().starts_with(prefix))
        .map(|m| m.path.clone())
        .collect()
}

/// Every member whose containing folder includes `text` anywhere in it,
/// e.g. every copy in a folder named like `backup`.
#[must_use]
pub fn folder_containing(result: &ScanResult, text: &str) -> Vec<LogicalPath> {
    result
        .groups()
        .iter()
        .flat_map(|g| g.members.iter())
        .filter(|m| m.folder().contains(text))
        .map(|m| m.path.clone())
        .collect()
}
