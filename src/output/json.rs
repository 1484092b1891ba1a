//! JSON output for scripting.
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "id": 1,
//!       "fingerprint": "9f86d08...",
//!       "members": [
//!         { "path": "/data/a.txt", "file_name": "a.txt", "folder": "/data", "size": 10240, "size_kb": 10.0 }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "scanned_items": 12,
//!     "total_files": 2,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 10240,
//!     "scan_duration_ms": 3,
//!     "scan_errors": [
//!       { "path": "/data/broken.zip", "error": "Archive error for /data/broken.zip: ..." }
//!     ],
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```
//!
//! `clean` adds a `remediation` object with per-item outcomes.

use std::io::Write;

use serde::Serialize;

use crate::actions::RemediationReport;
use crate::duplicates::{DuplicateGroup, GroupMember, ScanResult, ScanSummary};
use crate::error::ExitCode;

#[derive(Debug, Clone, Serialize)]
pub struct JsonMember {
    pub path: String,
    pub file_name: String,
    pub folder: String,
    pub size: u64,
    pub size_kb: f64,
}

impl From<&GroupMember> for JsonMember {
    fn from(member: &GroupMember) -> Self {
        Self {
            path: member.path.to_string(),
            file_name: member.file_name(),
            folder: member.folder(),
            size: member.size,
            size_kb: (member.size_kb() * 10.0).round() / 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    pub id: usize,
    pub fingerprint: String,
    pub members: Vec<JsonMember>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            id: group.id,
            fingerprint: group.fingerprint.to_string(),
            members: group.members.iter().map(JsonMember::from).collect(),
        }
    }
}

/// Aggregate counts for the published group table.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Items hashed by the scan, duplicates or not
    pub scanned_items: usize,
    /// Members across all duplicate groups
    pub total_files: usize,
    pub duplicate_groups: usize,
    pub reclaimable_space: u64,
    pub scan_duration_ms: u64,
    /// Items the scan could not read
    pub scan_errors: Vec<JsonFailure>,
    pub exit_code: i32,
    pub exit_code_name: String,
}

impl JsonSummary {
    #[must_use]
    pub fn new(result: &ScanResult, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            scanned_items: summary.total_files,
            total_files: result.total_files(),
            duplicate_groups: result.group_count(),
            reclaimable_space: result.reclaimable_bytes(),
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            scan_errors: summary
                .scan_errors
                .iter()
                .map(|e| JsonFailure {
                    path: e.item(),
                    error: e.to_string(),
                })
                .collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonOutcome {
    pub path: String,
    pub action: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    pub path: String,
    pub error: String,
}

/// Per-item results of a `clean` run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRemediation {
    pub strategy: String,
    pub successes: Vec<JsonOutcome>,
    pub failures: Vec<JsonFailure>,
    pub bytes_reclaimed: u64,
    pub groups_dropped: usize,
}

impl JsonRemediation {
    #[must_use]
    pub fn new(strategy: &str, report: &RemediationReport) -> Self {
        Self {
            strategy: strategy.to_string(),
            successes: report
                .successes
                .iter()
                .map(|o| JsonOutcome {
                    path: o.path.to_string(),
                    action: o.action.to_string(),
                    size: o.size,
                })
                .collect(),
            failures: report
                .failures
                .iter()
                .map(|(path, err)| JsonFailure {
                    path: path.to_string(),
                    error: err.to_string(),
                })
                .collect(),
            bytes_reclaimed: report.bytes_reclaimed,
            groups_dropped: report.groups_dropped,
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub duplicates: Vec<JsonDuplicateGroup>,
    pub summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<JsonRemediation>,
}

impl JsonOutput {
    #[must_use]
    pub fn new(result: &ScanResult, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: result.groups().iter().map(JsonDuplicateGroup::from).collect(),
            summary: JsonSummary::new(result, summary, exit_code),
            remediation: None,
        }
    }

    /// Attach the outcome of a remediation batch.
    #[must_use]
    pub fn with_remediation(mut self, strategy: &str, report: &RemediationReport) -> Self {
        self.remediation = Some(JsonRemediation::new(strategy, report));
        self
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)
    }
}
