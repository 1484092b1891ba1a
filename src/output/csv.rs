//! CSV listing of duplicate groups, one row per member.
//!
//! Columns: `group_id`, `fingerprint`, `file_name`, `folder`, `size_kb`.
//! Archive members list their archive reference as the folder, e.g.
//! `/data/x.zip#docs`.

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;

/// Errors that can occur while writing CSV.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

const HEADER: [&str; 5] = ["group_id", "fingerprint", "file_name", "folder", "size_kb"];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    fingerprint: &'a str,
    file_name: String,
    folder: String,
    size_kb: String,
}

/// CSV formatter over a borrowed group table.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the header and all rows to `writer`. The header is written
    /// even when there are no groups.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(HEADER)?;

        for group in self.groups {
            for member in &group.members {
                csv_writer.serialize(CsvRow {
                    group_id: group.id,
                    fingerprint: group.fingerprint.as_str(),
                    file_name: member.file_name(),
                    folder: member.folder(),
                    size_kb: format!("{:.1}", member.size_kb()),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render into a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
