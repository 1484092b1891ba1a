//! Layered configuration.
//!
//! Settings are merged from, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `config.toml` in the platform config directory (or `--config PATH`)
//! 3. `DUPESWEEP_*` environment variables
//!
//! CLI flags are applied on top by the caller.
//!
//! ```toml
//! min_size_kb = 1
//! extensions = ["jpg", "png"]
//! search_zip = true
//! strategy = "move"
//! destination = "/data/duplicates"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::{RemediationStrategy, DEFAULT_ARCHIVE_TOOL};
use crate::scanner::ScanFilter;

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Remediation strategy as written in config files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Permanent deletion
    Delete,
    /// Move to the system trash
    #[default]
    Trash,
    /// Move into a consolidation folder (needs a destination)
    Move,
    /// Replace with a hard link to the retained copy
    Hardlink,
}

impl StrategyKind {
    /// Combine with a destination into a concrete strategy.
    ///
    /// A missing destination for `Move` becomes an empty path, which
    /// [`RemediationStrategy::validate`] rejects before any file is touched.
    #[must_use]
    pub fn into_strategy(self, destination: Option<&Path>) -> RemediationStrategy {
        match self {
            Self::Delete => RemediationStrategy::PermanentDelete,
            Self::Trash => RemediationStrategy::TrashMove,
            Self::Move => RemediationStrategy::RelocateToFolder {
                destination: destination.map(Path::to_path_buf).unwrap_or_default(),
            },
            Self::Hardlink => RemediationStrategy::HardlinkReplace,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Delete => "delete",
            Self::Trash => "trash",
            Self::Move => "move",
            Self::Hardlink => "hardlink",
        };
        f.write_str(name)
    }
}

/// Persistent defaults for scans and clean runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum file size in KB
    pub min_size_kb: u64,
    /// Maximum file size in KB; unset means unbounded
    pub max_size_kb: Option<u64>,
    /// Extension allow-list; empty allows everything
    pub extensions: Vec<String>,
    /// Extension deny-list
    pub skip_extensions: Vec<String>,
    /// Hash members of ZIP archives
    pub search_zip: bool,
    /// Default strategy for `clean`
    pub strategy: StrategyKind,
    /// Consolidation folder for the `move` strategy
    pub destination: Option<PathBuf>,
    /// Program used to delete archive members
    pub archive_tool: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size_kb: 0,
            max_size_kb: None,
            extensions: Vec::new(),
            skip_extensions: Vec::new(),
            search_zip: false,
            strategy: StrategyKind::default(),
            destination: None,
            archive_tool: PathBuf::from(DEFAULT_ARCHIVE_TOOL),
        }
    }
}

impl Config {
    /// Load from the default file location and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment variable holds a
    /// value of the wrong type.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Load from `path` (if it exists) and the environment.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from(path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let figment = Self::figment(path);
        let config: Config = figment.extract().map_err(Box::new)?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// The provider stack without extracting it.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if path.exists() {
                log::debug!("Reading config file {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Platform config file location, e.g. `~/.config/dupesweep/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupesweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Scan filter described by this config.
    #[must_use]
    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter::default()
            .with_size_range(self.min_size_kb, self.max_size_kb.unwrap_or(u64::MAX))
            .with_extensions(&self.extensions)
            .with_skip_extensions(&self.skip_extensions)
            .with_search_zip(self.search_zip)
    }

    /// Default remediation strategy described by this config.
    #[must_use]
    pub fn remediation_strategy(&self) -> RemediationStrategy {
        self.strategy.into_strategy(self.destination.as_deref())
    }
}
