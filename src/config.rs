//! Persisted indexing configuration.
//!
//! A [`Config`] is the content of one `.tgcj` file: the ordered folder list
//! plus the settings that decide where and how each folder's report is
//! written. Every field has a default so older files missing newer fields
//! still load.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_FILE_NAME;

/// Where reports are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Each folder receives its own report.
    #[default]
    PerFolder,
    /// All reports land in `Config::custom_directory`.
    CustomDirectory,
}

/// Report format produced by the indexing engine.
///
/// The lower-cased variant name doubles as the report file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Txt,
    Html,
    Json,
}

impl ReportFormat {
    /// File extension for reports in this format (`txt`, `html`, `json`).
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// Settings handed to the indexing engine untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerSettings {
    /// Report format and extension
    pub output: ReportFormat,
    /// Show sizes in KiB/MiB (1024) rather than kB/MB (1000)
    pub binary_units: bool,
    /// Leave hidden files and folders out of the report
    pub skip_hidden: bool,
    /// Honour `.gitignore` and `.ignore` files
    pub respect_gitignore: bool,
    /// Descend into symlinked folders
    pub follow_symlinks: bool,
    /// Maximum nesting depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Print aggregated sizes next to every entry
    pub show_sizes: bool,
    /// Prefix repeated once per nesting level in text reports
    pub indentation: String,
    /// Append a summary footer
    pub add_footer: bool,
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            output: ReportFormat::Txt,
            binary_units: true,
            skip_hidden: true,
            respect_gitignore: false,
            follow_symlinks: false,
            max_depth: None,
            show_sizes: true,
            indentation: "|___".to_string(),
            add_footer: true,
        }
    }
}

/// Folder list and report placement settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folders to index, in indexing order. Duplicates are allowed.
    pub folders: Vec<PathBuf>,
    pub output_mode: OutputMode,
    /// Only consulted in [`OutputMode::CustomDirectory`].
    pub custom_directory: PathBuf,
    /// Report file name template.
    pub file_name: String,
    /// Prefix report names with `YYYY-MM-DD `.
    pub prepend_date: bool,
    pub indexer_settings: IndexerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            output_mode: OutputMode::PerFolder,
            custom_directory: PathBuf::new(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            prepend_date: false,
            indexer_settings: IndexerSettings::default(),
        }
    }
}

impl Config {
    /// Directory that receives the report for `folder`.
    #[must_use]
    pub fn index_dir<'a>(&'a self, folder: &'a Path) -> &'a Path {
        match self.output_mode {
            OutputMode::CustomDirectory => &self.custom_directory,
            OutputMode::PerFolder => folder,
        }
    }
}
