//! Logical paths: real files and members inside ZIP archives.
//!
//! A [`LogicalPath`] is either a plain filesystem path or a composite
//! reference `<zip-file-path>#<member-name>` pointing at an entry inside an
//! archive. The composite form is what users see in listings and what they
//! pass back in when selecting archive members for remediation.
//!
//! # Example
//!
//! ```
//! use dupesweep::scanner::LogicalPath;
//! use std::path::PathBuf;
//!
//! let member = LogicalPath::archive_member(PathBuf::from("/data/x.zip"), "docs/inner.txt");
//! assert_eq!(member.to_string(), "/data/x.zip#docs/inner.txt");
//! assert_eq!(member.file_name(), "inner.txt");
//! assert_eq!(LogicalPath::parse("/data/x.zip#docs/inner.txt"), member);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between the archive path and the member name.
pub const MEMBER_SEPARATOR: char = '#';

/// Identifies a scanned item: a real file or a named entry inside a ZIP archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalPath {
    /// A regular file on disk.
    File(PathBuf),
    /// An entry inside a ZIP archive.
    ArchiveMember {
        /// Path of the containing `.zip` file
        archive: PathBuf,
        /// Member name as stored in the central directory (always `/`-separated)
        member: String,
    },
}

impl LogicalPath {
    /// Reference to a regular file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Reference to a member inside an archive.
    #[must_use]
    pub fn archive_member(archive: impl Into<PathBuf>, member: impl Into<String>) -> Self {
        Self::ArchiveMember {
            archive: archive.into(),
            member: member.into(),
        }
    }

    /// Parse the textual form produced by `Display`.
    ///
    /// The archive part ends at the first `.zip#` (case-insensitive); anything
    /// without that marker is a plain file path, so file names that merely
    /// contain `#` stay intact.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let marker = ".zip#";
        let lower = s.to_ascii_lowercase();
        match lower.find(marker) {
            Some(idx) => {
                let split = idx + marker.len() - 1;
                let (archive, rest) = s.split_at(split);
                Self::archive_member(PathBuf::from(archive), &rest[1..])
            }
            None => Self::File(PathBuf::from(s)),
        }
    }

    /// Whether this is a composite (inside-archive) reference.
    #[must_use]
    pub fn is_archive_member(&self) -> bool {
        matches!(self, Self::ArchiveMember { .. })
    }

    /// The on-disk path backing this item: the file itself, or the containing archive.
    #[must_use]
    pub fn physical_path(&self) -> &Path {
        match self {
            Self::File(path) => path,
            Self::ArchiveMember { archive, .. } => archive,
        }
    }

    /// Path of a regular file, `None` for archive members.
    #[must_use]
    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::ArchiveMember { .. } => None,
        }
    }

    /// Base name shown to the user.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::ArchiveMember { member, .. } => member
                .rsplit('/')
                .next()
                .unwrap_or(member.as_str())
                .to_string(),
        }
    }

    /// Containing folder shown to the user.
    ///
    /// For archive members this is the archive reference plus the member's
    /// directory inside the archive, e.g. `/data/x.zip#docs`.
    #[must_use]
    pub fn folder(&self) -> String {
        match self {
            Self::File(path) => path
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::ArchiveMember { archive, member } => {
                let dir = member.rsplit_once('/').map_or("", |(dir, _)| dir);
                format!("{}{}{}", archive.display(), MEMBER_SEPARATOR, dir)
            }
        }
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::ArchiveMember { archive, member } => {
                write!(f, "{}{}{}", archive.display(), MEMBER_SEPARATOR, member)
            }
        }
    }
}

impl From<PathBuf> for LogicalPath {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for LogicalPath {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}
