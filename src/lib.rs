//! treeidx - batch directory-tree indexer driven by a persisted folder list
//!
//! A [`ConfigStore`] owns the folder list and report settings loaded from a
//! `.tgcj` file. An [`Orchestrator`] walks that list in order, asks an
//! [`IndexEngine`] for each folder's report and writes it where
//! [`resolve`] says, skipping folders that yield nothing.
//!
//! # Example
//!
//! ```rust
//! use treeidx::{ConfigStore, Orchestrator, TreeIndexer};
//! use std::time::{SystemTime, UNIX_EPOCH};
//!
//! let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
//! let root = std::env::temp_dir().join(format!("treeidx-doctest-{unique}"));
//! std::fs::create_dir_all(root.join("src"))?;
//! std::fs::write(root.join("src/main.rs"), "fn main() {}")?;
//!
//! let store = ConfigStore::new();
//! store.add_folder(&root);
//! let outcome = store.save(root.join("folders.tgcj")).wait();
//! assert!(outcome.is_success());
//!
//! let report = Orchestrator::new(TreeIndexer).run(&store.config())?;
//! assert_eq!(report.written_count(), 1);
//!
//! let _ = std::fs::remove_dir_all(&root);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Extension of persisted config files.
pub const CONFIG_EXTENSION: &str = "tgcj";

/// Display name of a config that has never been saved.
pub const CONFIG_NEW_FILE_NAME: &str = "New config";

/// Default report file name template.
pub const DEFAULT_FILE_NAME: &str = "Index";

/// Suffix of the temp file used while a config is being replaced.
pub const TMP_SUFFIX: &str = ".tmp";

pub mod cli;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
mod fs_utils;
pub mod orchestrator;
pub mod output;
pub mod store;

pub use codec::{ConfigCodec, JsonCodec};
pub use config::{Config, IndexerSettings, OutputMode, ReportFormat};
pub use engine::{FileInfo, FolderInfo, IndexEngine, TreeIndexer, format_size};
pub use error::{ExitCode, Result, TreeIndexError};
pub use orchestrator::{FolderOutcome, Orchestrator, RunReport, SkipReason};
pub use output::{index_file_name, resolve, sanitize_file_name};
pub use store::{ConfigStore, SaveHandle, SaveOutcome};
