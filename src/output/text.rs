//! Human-readable listing for the terminal.
//!
//! ```text
//! Group 1  9f86d081a2b3  2 files
//!   a.txt                          /data                           10.0 KB
//!   inner.txt                      /data/x.zip#                    10.0 KB
//!
//! Total files: 2, duplicate groups: 1, space to be freed: 10.0 KiB
//!
//! Skipped 1 unreadable item(s):
//!   Permission denied: /data/locked.txt
//! ```

use std::io::{self, Write};

use yansi::{Paint, Style};

use crate::actions::RemediationReport;
use crate::duplicates::ScanResult;
use crate::orchestrator::ScanStats;
use crate::scanner::ScanError;

const HEADER: Style = Style::new().cyan().bold();
const DIM: Style = Style::new().dim();
const GOOD: Style = Style::new().green();
const BAD: Style = Style::new().red();

/// Plain-text formatter; colors are optional.
pub struct TextOutput<'a> {
    result: &'a ScanResult,
    scan_errors: &'a [ScanError],
    color: bool,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(result: &'a ScanResult) -> Self {
        Self {
            result,
            scan_errors: &[],
            color: false,
        }
    }

    /// List items the scan could not read after the groups.
    #[must_use]
    pub fn with_scan_errors(mut self, scan_errors: &'a [ScanError]) -> Self {
        self.scan_errors = scan_errors;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn styled(&self, text: impl std::fmt::Display, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write every group followed by the aggregate counts and any
    /// unreadable items.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.result.is_empty() {
            writeln!(writer, "{}", self.styled("No duplicates found.", GOOD))?;
            return self.write_scan_errors(&mut writer);
        }

        for group in self.result.groups() {
            let header = format!(
                "Group {}  {}  {} files",
                group.id,
                group.fingerprint.short(),
                group.len()
            );
            writeln!(writer, "{}", self.styled(header, HEADER))?;
            for member in &group.members {
                writeln!(
                    writer,
                    "  {:<30} {} {:>10.1} KB",
                    member.file_name(),
                    self.styled(format!("{:<30}", member.folder()), DIM),
                    member.size_kb()
                )?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "{}", ScanStats::of(self.result))?;
        self.write_scan_errors(&mut writer)
    }

    fn write_scan_errors<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.scan_errors.is_empty() {
            return Ok(());
        }
        writeln!(writer)?;
        let header = format!("Skipped {} unreadable item(s):", self.scan_errors.len());
        writeln!(writer, "{}", self.styled(header, BAD))?;
        for error in self.scan_errors {
            writeln!(writer, "  {}", error)?;
        }
        Ok(())
    }

    /// Write one line per remediated item and a closing summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_report<W: Write>(&self, report: &RemediationReport, mut writer: W) -> io::Result<()> {
        for outcome in &report.successes {
            writeln!(
                writer,
                "{} {} ({})",
                self.styled("ok  ", GOOD),
                outcome.path,
                outcome.action
            )?;
        }
        for (path, err) in &report.failures {
            writeln!(writer, "{} {}: {}", self.styled("FAIL", BAD), path, err)?;
        }
        writeln!(writer, "{}", report.summary())
    }

    /// Render the group listing into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
