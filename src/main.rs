use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use treeidx::{
    ConfigStore, FolderOutcome, Orchestrator, TreeIndexer,
    cli::{Cli, Commands, OutputFormat, SetArgs},
    error::{ExitCode, Result, TreeIndexError},
    output::resolve,
};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Structured logging to stderr (respects RUST_LOG, default WARN).
    // --quiet disables all logging output.
    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }

    let config_path = match cli.config_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve config path");
            return ExitCode::NoInput.into();
        }
    };
    tracing::debug!(
        config = %config_path.display(),
        mutating = cli.mutates_config(),
        "Resolved config path"
    );

    let result = match &cli.command {
        Commands::New { force } => run_new(&config_path, *force, cli.quiet),
        Commands::Add { folders, existing_only } => {
            run_add(&config_path, folders, *existing_only, cli.quiet)
        }
        Commands::Remove { folders } => run_remove(&config_path, folders, cli.quiet),
        Commands::MoveUp { index } => run_move(&config_path, *index, true, cli.quiet),
        Commands::MoveDown { index } => run_move(&config_path, *index, false, cli.quiet),
        Commands::Set(args) => run_set(&config_path, args, cli.quiet),
        Commands::Show { format } => run_show(&config_path, *format),
        Commands::Resolve { folder } => run_resolve(&config_path, folder),
        Commands::Index => run_index(&config_path),
    };

    match result {
        Ok(()) => ExitCode::Ok.into(),
        Err(e) => {
            tracing::error!(error = %e, config = %config_path.display(), "Command failed");
            e.exit_code().into()
        }
    }
}

/// Load an existing config, failing with `ConfigNotFound` if there is none.
fn load_existing(path: &Path) -> Result<ConfigStore> {
    if !path.exists() {
        return Err(TreeIndexError::ConfigNotFound { path: path.to_path_buf() });
    }
    let store = ConfigStore::new();
    store.load(path)?;
    Ok(store)
}

/// Persist `store` to `path` and wait for the outcome.
fn save_and_wait(store: &ConfigStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let outcome = store.save(path).wait();
    tracing::info!(dirty = store.is_dirty(), "{}", outcome.message());
    outcome.result
}

/// Load (or start a new config), apply `edit`, save.
fn run_edit<F>(path: &Path, quiet: bool, edit: F) -> Result<()>
where
    F: FnOnce(&ConfigStore) -> Result<String>,
{
    let store = ConfigStore::new();
    if path.exists() {
        store.load(path)?;
    } else {
        tracing::info!(path = %path.display(), "Config not found, starting a new one");
    }

    let message = edit(&store)?;
    save_and_wait(&store, path)?;

    if !quiet {
        println!("{message}");
    }
    Ok(())
}

fn run_new(path: &Path, force: bool, quiet: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(TreeIndexError::ConfigInvalid {
            field: "config".to_string(),
            value: path.display().to_string(),
            reason: "already exists (use --force to overwrite)".to_string(),
        });
    }

    let store = ConfigStore::new();
    save_and_wait(&store, path)?;
    if !quiet {
        println!("Created {}", path.display());
    }
    Ok(())
}

/// Absolute form of path arguments; the config must not depend on the cwd.
fn absolute_folders(folders: &[PathBuf]) -> Result<Vec<PathBuf>> {
    folders.iter().map(|f| std::path::absolute(f).map_err(Into::into)).collect()
}

fn run_add(path: &Path, folders: &[PathBuf], existing_only: bool, quiet: bool) -> Result<()> {
    let mut folders = absolute_folders(folders)?;
    if existing_only {
        folders.retain(|folder| {
            let keep = folder.is_dir();
            if !keep {
                tracing::warn!(folder = %folder.display(), "Not a directory, not adding");
            }
            keep
        });
    }

    run_edit(path, quiet, |store| {
        let count = folders.len();
        store.add_folders(folders);
        Ok(format!("Added {count} folder(s)"))
    })
}

fn run_remove(path: &Path, folders: &[PathBuf], quiet: bool) -> Result<()> {
    let folders = absolute_folders(folders)?;
    run_edit(path, quiet, |store| {
        let removed: usize = folders.iter().map(|folder| store.remove_folder(folder)).sum();
        Ok(format!("Removed {removed} folder(s)"))
    })
}

fn run_set(path: &Path, args: &SetArgs, quiet: bool) -> Result<()> {
    let mut args = args.clone();
    if let Some(dir) = &args.custom_dir {
        args.custom_dir = Some(std::path::absolute(dir)?);
    }

    run_edit(path, quiet, |store| {
        let changed = store.update(|config| args.apply(config));
        Ok(format!("Updated {changed} setting(s)"))
    })
}

fn run_move(path: &Path, index: usize, up: bool, quiet: bool) -> Result<()> {
    run_edit(path, quiet, |store| {
        let moved = if up { store.move_folder_up(index) } else { store.move_folder_down(index) };
        if moved {
            Ok(format!("Moved folder {index} {}", if up { "up" } else { "down" }))
        } else {
            Ok(format!("Folder {index} cannot move {}", if up { "up" } else { "down" }))
        }
    })
}

fn run_show(path: &Path, format: OutputFormat) -> Result<()> {
    let store = load_existing(path)?;
    let config = store.config();
    let mut out = io::stdout().lock();

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &config)
                .map_err(|source| TreeIndexError::Serialize { source })?;
            writeln!(out)?;
        }
        OutputFormat::Plain => {
            let settings = &config.indexer_settings;
            writeln!(out, "Config:           {}", path.display())?;
            writeln!(out, "Output mode:      {:?}", config.output_mode)?;
            writeln!(out, "Custom directory: {}", config.custom_directory.display())?;
            writeln!(out, "File name:        {}", config.file_name)?;
            writeln!(out, "Prepend date:     {}", config.prepend_date)?;
            writeln!(out, "Format:           {}", settings.output.extension())?;
            writeln!(out, "Binary units:     {}", settings.binary_units)?;
            writeln!(out, "Folders:          {}", config.folders.len())?;
            for (index, folder) in config.folders.iter().enumerate() {
                writeln!(out, "  {index:>3}  {}", folder.display())?;
            }
        }
    }
    Ok(())
}

fn run_resolve(path: &Path, folder: &Path) -> Result<()> {
    let store = load_existing(path)?;
    let folder = std::path::absolute(folder)?;
    let today = chrono::Local::now().date_naive();

    match resolve(&store.config(), &folder, today) {
        Some(report) => println!("{}", report.display()),
        None => println!("skip: output directory for {} does not exist", folder.display()),
    }
    Ok(())
}

fn run_index(path: &Path) -> Result<()> {
    let store = load_existing(path)?;
    let config = store.config();
    if config.folders.is_empty() {
        tracing::warn!(path = %path.display(), "No folders configured");
    }

    let report = Orchestrator::new(TreeIndexer).run(&config)?;

    let mut out = io::stdout().lock();
    for (folder, outcome) in &report.outcomes {
        match outcome {
            FolderOutcome::Written(file) => writeln!(out, "written  {}", file.display())?,
            FolderOutcome::Skipped(reason) => {
                writeln!(out, "skipped  {}  ({})", folder.display(), reason.as_str())?;
            }
        }
    }
    Ok(())
}
