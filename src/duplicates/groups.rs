//! Duplicate grouping by content fingerprint and the live group table.
//!
//! # Overview
//!
//! [`group_by_fingerprint`] aggregates scanned items into
//! [`DuplicateGroup`]s. Member order inside a group is first-seen order,
//! and groups are ordered by the first-seen position of their first member.
//! Fingerprints seen only once are discarded.
//!
//! [`ScanResult`] is the table that remediation mutates. Removing members can
//! leave a group with a single entry; [`ScanResult::drop_singletons`] sweeps
//! those away so every visible group is still a real duplicate set.
//!
//! # Example
//!
//! ```
//! use dupesweep::duplicates::group_by_fingerprint;
//! use dupesweep::scanner::{Fingerprint, LogicalPath, ScanItem};
//!
//! let item = |path: &str, fp: &str| ScanItem {
//!     path: LogicalPath::file(path),
//!     fingerprint: Fingerprint::from_hex(fp),
//!     size: 1024,
//! };
//!
//! let result = group_by_fingerprint(vec![
//!     item("/a.txt", "aa"),
//!     item("/b.txt", "aa"),
//!     item("/c.txt", "cc"),
//! ]);
//!
//! assert_eq!(result.group_count(), 1);
//! assert_eq!(result.total_files(), 2);
//! assert_eq!(result.reclaimable_bytes(), 1024);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::scanner::{Fingerprint, LogicalPath, ScanItem};

/// One entry of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    /// File or archive member
    pub path: LogicalPath,
    /// Size in bytes (stored uncompressed size for archive members)
    pub size: u64,
}

impl GroupMember {
    /// Create a new member.
    #[must_use]
    pub fn new(path: LogicalPath, size: u64) -> Self {
        Self { path, size }
    }

    /// Base file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name()
    }

    /// Containing folder (archive reference for members).
    #[must_use]
    pub fn folder(&self) -> String {
        self.path.folder()
    }

    /// Size in kilobytes, for display with one decimal.
    #[must_use]
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

/// Confirmed duplicate group: two or more items with the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// 1-based identifier assigned at grouping time; stable across remediation
    pub id: usize,
    /// SHA-256 content fingerprint shared by every member
    pub fingerprint: Fingerprint,
    /// Members in first-seen order
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(id: usize, fingerprint: Fingerprint, members: Vec<GroupMember>) -> Self {
        Self {
            id,
            fingerprint,
            members,
        }
    }

    /// Number of members in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the group still describes a duplicate set.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }

    /// Check membership.
    #[must_use]
    pub fn contains(&self, path: &LogicalPath) -> bool {
        self.members.iter().any(|m| &m.path == path)
    }

    /// Get just the paths of members in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<LogicalPath> {
        self.members.iter().map(|m| m.path.clone()).collect()
    }

    /// Total size of all members in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Space held by every member except the first.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.members.iter().skip(1).map(|m| m.size).sum()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Remove a member, returning it if present.
    pub fn remove(&mut self, path: &LogicalPath) -> Option<GroupMember> {
        let index = self.members.iter().position(|m| &m.path == path)?;
        Some(self.members.remove(index))
    }
}

/// The published outcome of one scan: the live duplicate group table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    groups: Vec<DuplicateGroup>,
}

impl ScanResult {
    /// Wrap groups produced elsewhere. Groups with fewer than two members are dropped.
    #[must_use]
    pub fn new(groups: Vec<DuplicateGroup>) -> Self {
        let mut result = Self { groups };
        result.drop_singletons();
        result
    }

    /// Current groups in display order.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Whether no duplicates remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of tracked files (members across all groups).
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Bytes freed if each group were reduced to its first member.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }

    /// Find the group holding `path`.
    #[must_use]
    pub fn locate(&self, path: &LogicalPath) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.contains(path))
    }

    /// Whether `path` is tracked by any group.
    #[must_use]
    pub fn contains(&self, path: &LogicalPath) -> bool {
        self.locate(path).is_some()
    }

    /// Remove `path` from its group. The group is kept even if it drops
    /// below two members; call [`drop_singletons`](Self::drop_singletons)
    /// once the batch is done.
    pub fn remove_path(&mut self, path: &LogicalPath) -> Option<GroupMember> {
        self.groups.iter_mut().find_map(|g| g.remove(path))
    }

    /// Remove every tracked member stored inside `archive`, returning how
    /// many were removed. Used when the archive file itself moves or goes away.
    pub fn remove_archive_members(&mut self, archive: &Path) -> usize {
        let mut removed = 0;
        for group in &mut self.groups {
            let before = group.members.len();
            group.members.retain(|m| {
                !matches!(&m.path, LogicalPath::ArchiveMember { archive: a, .. } if a == archive)
            });
            removed += before - group.members.len();
        }
        removed
    }

    /// Drop every group with one member or fewer, returning how many were dropped.
    pub fn drop_singletons(&mut self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|g| {
            if g.is_duplicate() {
                true
            } else {
                log::debug!("Group {} no longer holds duplicates", g.id);
                false
            }
        });
        before - self.groups.len()
    }

    /// Consume the result, yielding its groups.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.groups
    }
}

/// Group scanned items by fingerprint.
///
/// Members keep first-seen order and groups are numbered from 1 in the
/// order their first member was seen. An item whose path was already seen
/// (overlapping roots) is counted once.
#[must_use]
pub fn group_by_fingerprint(items: impl IntoIterator<Item = ScanItem>) -> ScanResult {
    let mut order: Vec<Fingerprint> = Vec::new();
    let mut buckets: HashMap<Fingerprint, Vec<GroupMember>> = HashMap::new();
    let mut seen: HashSet<LogicalPath> = HashSet::new();
    let mut total = 0usize;

    for item in items {
        if !seen.insert(item.path.clone()) {
            log::trace!("Ignoring repeated path: {}", item.path);
            continue;
        }
        total += 1;

        let bucket = buckets.entry(item.fingerprint.clone()).or_insert_with(|| {
            order.push(item.fingerprint.clone());
            Vec::new()
        });
        bucket.push(GroupMember::new(item.path, item.size));
    }

    let mut groups = Vec::new();
    for fingerprint in order {
        let Some(members) = buckets.remove(&fingerprint) else {
            continue;
        };
        if members.len() < 2 {
            continue;
        }
        log::debug!(
            "Group {}: {} members share {}",
            groups.len() + 1,
            members.len(),
            fingerprint.short()
        );
        groups.push(DuplicateGroup::new(groups.len() + 1, fingerprint, members));
    }

    log::info!(
        "Grouping complete: {} items -> {} duplicate groups",
        total,
        groups.len()
    );

    ScanResult { groups }
}
