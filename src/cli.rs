//! Command-line interface definitions.
//!
//! ```bash
//! # List duplicates under two folders, including ZIP members
//! dupesweep scan ~/Downloads ~/Archive --zip
//!
//! # Only pictures between 10 KB and 5000 KB, as CSV
//! dupesweep scan ~/Pictures --min-size 10 --max-size 5000 --ext jpg,png --output csv
//!
//! # Preview, then trash every copy but the first of each group
//! dupesweep clean ~/Downloads --strategy trash
//! dupesweep clean ~/Downloads --strategy trash --yes
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::StrategyKind;
use crate::scanner::{ScanFilter, ScanRoot};

/// Duplicate file finder with ZIP member scanning.
///
/// Files are grouped by SHA-256 content fingerprint. Duplicates can be
/// deleted, trashed, moved to a folder, or replaced with hard links.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Read settings from this file instead of the default config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories and list duplicate groups
    Scan(ScanArgs),
    /// Scan, select duplicates, and remediate them
    Clean(CleanArgs),
}

/// Scan roots and filters shared by every subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan
    #[arg(value_name = "DIR", required = true)]
    pub paths: Vec<PathBuf>,

    /// Minimum file size in KB (non-numeric values mean 0)
    #[arg(long, value_name = "KB")]
    pub min_size: Option<String>,

    /// Maximum file size in KB (non-numeric values mean no limit)
    #[arg(long, value_name = "KB")]
    pub max_size: Option<String>,

    /// Only consider these extensions (comma-separated, e.g. "jpg,png")
    #[arg(long = "ext", value_name = "LIST")]
    pub extensions: Option<String>,

    /// Never consider these extensions (comma-separated)
    #[arg(long = "skip-ext", value_name = "LIST")]
    pub skip_extensions: Option<String>,

    /// Also hash the members of ZIP archives
    #[arg(long)]
    pub zip: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

impl ScanArgs {
    /// Scan roots for the given directories.
    #[must_use]
    pub fn roots(&self) -> Vec<ScanRoot> {
        self.paths.iter().map(ScanRoot::new).collect()
    }

    /// Overlay the flags given on the command line onto `base`.
    #[must_use]
    pub fn filter(&self, base: ScanFilter) -> ScanFilter {
        let raw = ScanFilter::from_raw(
            self.min_size.as_deref(),
            self.max_size.as_deref(),
            self.extensions.as_deref(),
            self.skip_extensions.as_deref(),
            self.zip,
        );

        ScanFilter {
            min_size_kb: if self.min_size.is_some() {
                raw.min_size_kb
            } else {
                base.min_size_kb
            },
            max_size_kb: if self.max_size.is_some() {
                raw.max_size_kb
            } else {
                base.max_size_kb
            },
            extensions: if self.extensions.is_some() {
                raw.extensions
            } else {
                base.extensions
            },
            skip_extensions: if self.skip_extensions.is_some() {
                raw.skip_extensions
            } else {
                base.skip_extensions
            },
            search_zip: self.zip || base.search_zip,
        }
    }
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// What to do with the selected duplicates (default from config, else trash)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// Destination folder for the `move` strategy
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Which members to act on
    #[arg(long, value_enum, default_value = "all-but-first")]
    pub select: SelectMode,

    /// Folder used by the folder-based selections (text to look for with folder-contains)
    #[arg(long, value_name = "DIR", required_if_eq_any = [
        ("select", "in-folder"),
        ("select", "outside-folder"),
        ("select", "under"),
        ("select", "folder-contains"),
    ])]
    pub folder: Option<PathBuf>,

    /// Program used to delete ZIP members (7-Zip command line syntax)
    #[arg(long, value_name = "PATH")]
    pub archive_tool: Option<PathBuf>,

    /// Apply the strategy; without this flag only the selection is shown
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// How `clean` picks members from the group table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectMode {
    /// Every member except the first of each group
    AllButFirst,
    /// Members whose folder is exactly --folder
    InFolder,
    /// Copies outside --folder of files that also exist inside it
    OutsideFolder,
    /// Members located anywhere under --folder
    Under,
    /// Members whose folder contains the text given as --folder
    FolderContains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON for scripting
    Json,
    /// CSV, one row per member
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
