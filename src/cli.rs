use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::{
    CONFIG_EXTENSION,
    config::{Config, OutputMode, ReportFormat},
    error::{Result, TreeIndexError},
    output::is_invalid_name_char,
};

/// Output format for `show`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// CLI arguments for treeidx.
#[derive(Parser, Debug)]
#[command(
    name = "treeidx",
    version = env!("CARGO_PKG_VERSION"),
    about = "Batch directory-tree indexer driven by a persisted folder list",
    long_about = concat!("Batch directory-tree indexer driven by a persisted folder list

Keeps an ordered list of folders in a .tgcj config file and writes a
directory-tree report for each of them, either inside the folder itself or
into one shared output directory.

Version: ", env!("CARGO_PKG_VERSION"), "

SUBCOMMANDS:
  new        Create an empty config file
  add        Append folders to the list
  remove     Remove folders from the list
  move-up    Move a folder one place earlier
  move-down  Move a folder one place later
  set        Change report settings
  show       Print the config
  resolve    Print where a folder's report would be written
  index      Write reports for every folder

EXIT CODES:
  0   Success
  1   Internal error
  2   Invalid input (malformed config, bad value)
  3   I/O error (config unreadable, save failed)
  4   Missing input (config file not found)"),
    disable_help_flag = false,
    disable_version_flag = false
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress status messages and logging (for CI/scripting)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Config file (defaults to <config dir>/treeidx/default.tgcj)
    #[arg(long, short = 'c', env = "TREEIDX_CONFIG", global = true, value_parser = validate_config_path)]
    pub config: Option<PathBuf>,
}

/// Subcommands for treeidx.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create an empty config file.
    New {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Append folders to the list (duplicates are kept).
    Add {
        #[arg(required = true)]
        folders: Vec<PathBuf>,
        /// Drop paths that are not existing directories
        #[arg(long)]
        existing_only: bool,
    },
    /// Remove every occurrence of the given folders.
    Remove {
        #[arg(required = true)]
        folders: Vec<PathBuf>,
    },
    /// Move the folder at INDEX one place earlier.
    MoveUp { index: usize },
    /// Move the folder at INDEX one place later.
    MoveDown { index: usize },
    /// Change report settings.
    Set(SetArgs),
    /// Print the config.
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print where the report for FOLDER would be written.
    Resolve { folder: PathBuf },
    /// Write reports for every configured folder.
    Index,
}

/// Settings changed by `treeidx set`. Unset options are left alone.
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Write reports next to each folder or into --custom-dir
    #[arg(long, value_enum)]
    pub output_mode: Option<OutputMode>,
    /// Shared output directory for custom-directory mode
    #[arg(long)]
    pub custom_dir: Option<PathBuf>,
    /// Report file name template
    #[arg(long, value_parser = validate_file_name)]
    pub file_name: Option<String>,
    /// Prefix report names with the current date
    #[arg(long)]
    pub prepend_date: Option<bool>,
    /// Report format (also the report extension)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    /// Binary (KiB) instead of decimal (kB) size units
    #[arg(long)]
    pub binary_units: Option<bool>,
    /// Leave hidden entries out of reports
    #[arg(long)]
    pub skip_hidden: Option<bool>,
    /// Honour .gitignore and .ignore files
    #[arg(long)]
    pub respect_gitignore: Option<bool>,
    /// Descend into symlinked folders
    #[arg(long)]
    pub follow_symlinks: Option<bool>,
    /// Maximum nesting depth (0 = unlimited)
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// Show sizes next to entries
    #[arg(long)]
    pub show_sizes: Option<bool>,
    /// Text report indentation per level
    #[arg(long)]
    pub indentation: Option<String>,
    /// Append a summary footer
    #[arg(long)]
    pub footer: Option<bool>,
}

impl SetArgs {
    /// Copy every provided option into `config`, returning how many were set.
    pub fn apply(&self, config: &mut Config) -> usize {
        let mut changed = 0;

        if let Some(mode) = self.output_mode {
            config.output_mode = mode;
            changed += 1;
        }
        if let Some(dir) = &self.custom_dir {
            config.custom_directory.clone_from(dir);
            changed += 1;
        }
        if let Some(name) = &self.file_name {
            config.file_name.clone_from(name);
            changed += 1;
        }
        if let Some(prepend) = self.prepend_date {
            config.prepend_date = prepend;
            changed += 1;
        }

        let settings = &mut config.indexer_settings;
        if let Some(format) = self.format {
            settings.output = format;
            changed += 1;
        }
        if let Some(binary) = self.binary_units {
            settings.binary_units = binary;
            changed += 1;
        }
        if let Some(skip) = self.skip_hidden {
            settings.skip_hidden = skip;
            changed += 1;
        }
        if let Some(respect) = self.respect_gitignore {
            settings.respect_gitignore = respect;
            changed += 1;
        }
        if let Some(follow) = self.follow_symlinks {
            settings.follow_symlinks = follow;
            changed += 1;
        }
        if let Some(depth) = self.max_depth {
            // 0 clears the limit
            settings.max_depth = (depth > 0).then_some(depth);
            changed += 1;
        }
        if let Some(show) = self.show_sizes {
            settings.show_sizes = show;
            changed += 1;
        }
        if let Some(indentation) = &self.indentation {
            settings.indentation.clone_from(indentation);
            changed += 1;
        }
        if let Some(footer) = self.footer {
            settings.add_footer = footer;
            changed += 1;
        }

        changed
    }
}

/// Validates config paths: must carry the `.tgcj` extension.
fn validate_config_path(s: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(s);
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(CONFIG_EXTENSION));

    if has_extension { Ok(path) } else { Err(format!("must end in .{CONFIG_EXTENSION}")) }
}

/// Validates the report name template: non-empty, no path separators.
fn validate_file_name(s: &str) -> std::result::Result<String, String> {
    if s.trim().is_empty() {
        return Err("must not be empty".to_string());
    }

    if s.chars().any(is_invalid_name_char) {
        return Err("must not contain < > : \" / \\ | ? * or control characters".to_string());
    }

    Ok(s.to_string())
}

/// Platform default config file, `<config dir>/treeidx/default.tgcj`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treeidx").join(format!("default.{CONFIG_EXTENSION}")))
}

impl Cli {
    /// Get the resolved config file path.
    ///
    /// # Errors
    /// Returns `TreeIndexError::ConfigInvalid` if:
    /// - The `~` home directory expansion fails (home directory cannot be determined)
    /// - No path is given and the platform config directory is unknown
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => expand_tilde(path),
            None => default_config_path().ok_or_else(|| TreeIndexError::ConfigInvalid {
                field: "config".to_string(),
                value: "<default>".to_string(),
                reason: "Could not determine config directory".to_string(),
            }),
        }
    }

    /// Returns true if the subcommand changes the config file.
    #[must_use]
    pub const fn mutates_config(&self) -> bool {
        matches!(
            self.command,
            Commands::New { .. }
                | Commands::Add { .. }
                | Commands::Remove { .. }
                | Commands::MoveUp { .. }
                | Commands::MoveDown { .. }
                | Commands::Set(_)
        )
    }
}

/// Expand tilde (`~`) to home directory in path.
///
/// # Errors
/// Returns `TreeIndexError::ConfigInvalid` if the home directory is unknown.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if let Some(stripped) = path.to_str().and_then(|s| s.strip_prefix('~')) {
        if stripped.is_empty() || stripped.starts_with('/') || stripped.starts_with('\\') {
            let home = dirs::home_dir().ok_or_else(|| TreeIndexError::ConfigInvalid {
                field: "config".to_string(),
                value: path.to_string_lossy().to_string(),
                reason: "Could not determine home directory".to_string(),
            })?;
            if stripped.is_empty() {
                return Ok(home);
            }
            return Ok(home.join(&stripped[1..]));
        }
    }
    Ok(path.to_path_buf())
}
