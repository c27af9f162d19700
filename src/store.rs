//! Ownership and load/save lifecycle of the live [`Config`].
//!
//! [`ConfigStore`] is the single owner of the config being edited. Every
//! mutation marks it dirty, whether or not anything actually changed; only a
//! successful load, reset, or save clears the flag.
//!
//! # Concurrency
//!
//! State lives behind one mutex so the background save worker can report
//! back. Saving snapshots the config, writes it on a worker thread and hands
//! the caller a [`SaveHandle`]; the config counts as persisted only once
//! that handle yields a successful [`SaveOutcome`]. Edits made while a save
//! is in flight keep the store dirty.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use parking_lot::Mutex;

use crate::codec::{ConfigCodec, JsonCodec};
use crate::config::{Config, IndexerSettings, OutputMode};
use crate::error::{Result, TreeIndexError};
use crate::fs_utils::write_atomic;
use crate::CONFIG_NEW_FILE_NAME;

#[derive(Debug, Default)]
struct StoreState {
    config: Config,
    dirty: bool,
    file_path: Option<PathBuf>,
    /// Bumped by every mutation, load and reset.
    revision: u64,
    /// Bumped when the config is replaced wholesale (load, reset).
    document: u64,
}

/// Result of one save, delivered through [`SaveHandle`].
#[derive(Debug)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub result: Result<()>,
}

impl SaveOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Human-readable status line.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.result {
            Ok(()) => format!("Saved {}", self.path.display()),
            Err(e) => format!("Failed to save {}: {e}", self.path.display()),
        }
    }
}

/// Completion notification for an in-flight save.
#[derive(Debug)]
pub struct SaveHandle {
    path: PathBuf,
    receiver: Receiver<SaveOutcome>,
}

impl SaveHandle {
    /// Destination of this save.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the save finishes.
    #[must_use]
    pub fn wait(self) -> SaveOutcome {
        self.receiver.recv().unwrap_or_else(|_| SaveOutcome {
            result: Err(TreeIndexError::SaveInterrupted { path: self.path.clone() }),
            path: self.path,
        })
    }

    /// Outcome if the save already finished, `None` while it is running.
    #[must_use]
    pub fn try_outcome(&self) -> Option<SaveOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(SaveOutcome {
                path: self.path.clone(),
                result: Err(TreeIndexError::SaveInterrupted { path: self.path.clone() }),
            }),
        }
    }
}

/// Owner of the live config, its dirty flag and associated file.
pub struct ConfigStore<C: ConfigCodec = JsonCodec> {
    state: Arc<Mutex<StoreState>>,
    codec: Arc<C>,
}

impl ConfigStore<JsonCodec> {
    /// Store holding a default config with no associated file.
    #[must_use]
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl Default for ConfigStore<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ConfigCodec> ConfigStore<C> {
    /// Store using `codec` for persistence.
    pub fn with_codec(codec: C) -> Self {
        Self { state: Arc::new(Mutex::new(StoreState::default())), codec: Arc::new(codec) }
    }

    /// Replace the held config with the content of `path`.
    ///
    /// Nothing changes unless the file is read and decoded successfully.
    ///
    /// # Errors
    /// Returns `TreeIndexError::Io` if the file cannot be read and
    /// `TreeIndexError::Parse` if its content is malformed.
    pub fn load(&self, path: &Path) -> Result<()> {
        let bytes = fs::read(path)?;
        let config = self.codec.deserialize(&bytes, path)?;

        let mut state = self.state.lock();
        tracing::debug!(
            path = %path.display(),
            folders = config.folders.len(),
            "Loaded config"
        );
        state.config = config;
        state.file_path = Some(path.to_path_buf());
        state.dirty = false;
        state.revision += 1;
        state.document += 1;
        Ok(())
    }

    /// Start over with a default config and no associated file.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.config = Config::default();
        state.file_path = None;
        state.dirty = false;
        state.revision += 1;
        state.document += 1;
    }

    /// Persist a snapshot of the current config to `path` in the background.
    ///
    /// On success `path` becomes the associated file and the dirty flag is
    /// cleared, unless the config was edited after the snapshot was taken.
    pub fn save(&self, path: impl Into<PathBuf>) -> SaveHandle {
        let path = path.into();
        let (config, revision, document) = {
            let state = self.state.lock();
            (state.config.clone(), state.revision, state.document)
        };

        let (tx, receiver) = mpsc::channel();
        let worker_tx = tx.clone();
        let state = Arc::clone(&self.state);
        let codec = Arc::clone(&self.codec);
        let worker_path = path.clone();

        let spawned = thread::Builder::new().name("treeidx-save".to_string()).spawn(move || {
            let result = persist(codec.as_ref(), &config, &worker_path);

            if result.is_ok() {
                let mut state = state.lock();
                if state.document == document {
                    state.file_path = Some(worker_path.clone());
                    if state.revision == revision {
                        state.dirty = false;
                    }
                }
            }

            match &result {
                Ok(()) => tracing::debug!(path = %worker_path.display(), "Saved config"),
                Err(e) => tracing::warn!(
                    path = %worker_path.display(),
                    error = %e,
                    "Failed to save config"
                ),
            }

            let _ = worker_tx.send(SaveOutcome { path: worker_path, result });
        });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to start save worker");
            let _ = tx.send(SaveOutcome { path: path.clone(), result: Err(e.into()) });
        }

        SaveHandle { path, receiver }
    }

    /// Save to the file the config was loaded from or last saved to.
    ///
    /// # Errors
    /// Returns `TreeIndexError::NoConfigPath` for a config that has never
    /// been loaded or saved.
    pub fn save_current(&self) -> Result<SaveHandle> {
        let path = self.file_path().ok_or(TreeIndexError::NoConfigPath)?;
        Ok(self.save(path))
    }

    /// Apply `edit` to the config and mark it dirty.
    pub fn update<R>(&self, edit: impl FnOnce(&mut Config) -> R) -> R {
        let mut state = self.state.lock();
        let result = edit(&mut state.config);
        state.dirty = true;
        state.revision += 1;
        result
    }

    /// Append `folder`; duplicates are kept.
    pub fn add_folder(&self, folder: impl Into<PathBuf>) {
        let folder = folder.into();
        self.update(|config| config.folders.push(folder));
    }

    /// Append every folder in order. Marks dirty even when `folders` is empty.
    pub fn add_folders<I, P>(&self, folders: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let folders: Vec<PathBuf> = folders.into_iter().map(Into::into).collect();
        self.update(|config| config.folders.extend(folders));
    }

    /// Remove every entry equal to `folder`, returning how many went.
    pub fn remove_folder(&self, folder: &Path) -> usize {
        self.update(|config| {
            let before = config.folders.len();
            config.folders.retain(|f| f != folder);
            before - config.folders.len()
        })
    }

    /// Swap the folder at `index` with its predecessor.
    ///
    /// Returns false (still marking dirty) when there is nothing to move.
    pub fn move_folder_up(&self, index: usize) -> bool {
        self.update(|config| {
            if index == 0 || index >= config.folders.len() {
                return false;
            }
            config.folders.swap(index - 1, index);
            true
        })
    }

    /// Swap the folder at `index` with its successor.
    pub fn move_folder_down(&self, index: usize) -> bool {
        self.update(|config| {
            if index >= config.folders.len().saturating_sub(1) {
                return false;
            }
            config.folders.swap(index, index + 1);
            true
        })
    }

    pub fn set_output_mode(&self, mode: OutputMode) {
        self.update(|config| config.output_mode = mode);
    }

    pub fn set_custom_directory(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.update(|config| config.custom_directory = dir);
    }

    pub fn set_file_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.update(|config| config.file_name = name);
    }

    pub fn set_prepend_date(&self, prepend: bool) {
        self.update(|config| config.prepend_date = prepend);
    }

    pub fn set_indexer_settings(&self, settings: IndexerSettings) {
        self.update(|config| config.indexer_settings = settings);
    }

    /// True when the config has edits not yet confirmed saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// File the config was loaded from or last saved to.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        self.state.lock().file_path.clone()
    }

    /// Snapshot of the current config for a single indexing pass.
    #[must_use]
    pub fn config(&self) -> Config {
        self.state.lock().config.clone()
    }

    #[must_use]
    pub fn folders(&self) -> Vec<PathBuf> {
        self.state.lock().config.folders.clone()
    }

    /// File name of the associated config, or a placeholder for new configs.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.state
            .lock()
            .file_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| CONFIG_NEW_FILE_NAME.to_string(), |n| n.to_string_lossy().into_owned())
    }
}

fn persist<C: ConfigCodec>(codec: &C, config: &Config, path: &Path) -> Result<()> {
    let bytes = codec.serialize(config)?;
    write_atomic(path, &bytes)?;
    Ok(())
}
