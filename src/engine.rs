//! Directory-tree report generation.
//!
//! The orchestrator only sees [`IndexEngine`]. [`TreeIndexer`] is the stock
//! implementation: it walks a folder with the `ignore` crate, aggregates
//! sizes and counts bottom-up, and renders the tree as text, HTML or JSON.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;

use crate::config::{IndexerSettings, ReportFormat};

/// Produces the report for one folder.
///
/// `None` (or an empty string) means there is nothing to write for this
/// folder; the orchestrator skips it without raising an error.
pub trait IndexEngine {
    fn index(&self, folder: &Path, settings: &IndexerSettings) -> Option<String>;
}

impl<F> IndexEngine for F
where
    F: Fn(&Path, &IndexerSettings) -> Option<String>,
{
    fn index(&self, folder: &Path, settings: &IndexerSettings) -> Option<String> {
        self(folder, settings)
    }
}

/// A file inside an indexed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

/// A folder with its aggregated totals.
///
/// `size`, `file_count` and `folder_count` include every descendant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub file_count: u64,
    pub folder_count: u64,
    pub folders: Vec<FolderInfo>,
    pub files: Vec<FileInfo>,
}

impl FolderInfo {
    fn new(path: &Path) -> Self {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            name,
            path: path.to_path_buf(),
            size: 0,
            file_count: 0,
            folder_count: 0,
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    fn add_file(&mut self, name: String, size: u64) {
        self.size += size;
        self.file_count += 1;
        self.files.push(FileInfo { name, size });
    }

    fn add_folder(&mut self, child: Self) {
        self.size += child.size;
        self.file_count += child.file_count;
        self.folder_count += child.folder_count + 1;
        self.folders.push(child);
    }
}

/// Stock engine backed by a gitignore-aware directory walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeIndexer;

impl IndexEngine for TreeIndexer {
    fn index(&self, folder: &Path, settings: &IndexerSettings) -> Option<String> {
        let tree = scan(folder, settings)?;
        tracing::debug!(
            folder = %folder.display(),
            files = tree.file_count,
            folders = tree.folder_count,
            bytes = tree.size,
            "Scanned folder"
        );
        render(&tree, settings)
    }
}

/// Walk `folder` and build its tree. `None` if it is not a directory.
#[must_use]
pub fn scan(folder: &Path, settings: &IndexerSettings) -> Option<FolderInfo> {
    if !folder.is_dir() {
        return None;
    }

    let respect = settings.respect_gitignore;
    let mut builder = WalkBuilder::new(folder);
    builder
        .standard_filters(false)
        .hidden(settings.skip_hidden)
        .ignore(respect)
        .git_ignore(respect)
        .git_exclude(respect)
        .parents(respect)
        .require_git(false)
        .follow_links(settings.follow_symlinks)
        .max_depth(settings.max_depth)
        .sort_by_file_name(|a, b| a.cmp(b));

    // Entries arrive depth-first, parents before children. The stack holds
    // the open folder chain; a folder is folded into its parent once the
    // walk moves back above its depth.
    let mut stack: Vec<FolderInfo> = Vec::new();

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Directory walk error");
                continue;
            }
        };

        let depth = entry.depth();
        if depth == 0 {
            stack.push(FolderInfo::new(entry.path()));
            continue;
        }

        while stack.len() > depth {
            fold_top(&mut stack);
        }

        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            stack.push(FolderInfo::new(entry.path()));
            continue;
        }

        let Some(parent) = stack.last_mut() else {
            continue;
        };
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        parent.add_file(entry.file_name().to_string_lossy().into_owned(), size);
    }

    while stack.len() > 1 {
        fold_top(&mut stack);
    }
    stack.pop()
}

fn fold_top(stack: &mut Vec<FolderInfo>) {
    if let Some(child) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.add_folder(child),
            None => stack.push(child),
        }
    }
}

/// Render `tree` in the format selected by `settings`.
#[must_use]
pub fn render(tree: &FolderInfo, settings: &IndexerSettings) -> Option<String> {
    match settings.output {
        ReportFormat::Txt => Some(render_text(tree, settings)),
        ReportFormat::Html => Some(render_html(tree, settings)),
        ReportFormat::Json => match serde_json::to_string_pretty(tree) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode JSON report");
                None
            }
        },
    }
}

/// Human-readable size, e.g. `1.50 KiB` (binary) or `1.54 kB` (decimal).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: u64, binary_units: bool) -> String {
    let (base, units) = if binary_units {
        (1024.0, ["B", "KiB", "MiB", "GiB", "TiB", "PiB"])
    } else {
        (1000.0, ["B", "kB", "MB", "GB", "TB", "PB"])
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= base && unit < units.len() - 1 {
        value /= base;
        unit += 1;
    }

    if unit == 0 { format!("{bytes} B") } else { format!("{value:.2} {}", units[unit]) }
}

fn summary(tree: &FolderInfo, settings: &IndexerSettings) -> String {
    format!(
        "{} folders, {} files, {}. Generated by treeidx {}.",
        tree.folder_count,
        tree.file_count,
        format_size(tree.size, settings.binary_units),
        env!("CARGO_PKG_VERSION")
    )
}

fn render_text(tree: &FolderInfo, settings: &IndexerSettings) -> String {
    let mut out = String::new();
    write_text_folder(&mut out, tree, 0, settings);
    if settings.add_footer {
        out.push('\n');
        out.push_str(&summary(tree, settings));
        out.push('\n');
    }
    out
}

fn write_text_folder(out: &mut String, folder: &FolderInfo, level: usize, settings: &IndexerSettings) {
    let indent = settings.indentation.repeat(level);
    if settings.show_sizes {
        let _ = writeln!(
            out,
            "{indent}{} [{}]",
            folder.name,
            format_size(folder.size, settings.binary_units)
        );
    } else {
        let _ = writeln!(out, "{indent}{}", folder.name);
    }

    for child in &folder.folders {
        write_text_folder(out, child, level + 1, settings);
    }

    let indent = settings.indentation.repeat(level + 1);
    for file in &folder.files {
        if settings.show_sizes {
            let _ = writeln!(
                out,
                "{indent}{} [{}]",
                file.name,
                format_size(file.size, settings.binary_units)
            );
        } else {
            let _ = writeln!(out, "{indent}{}", file.name);
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_html(tree: &FolderInfo, settings: &IndexerSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(
        out,
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>",
        escape_html(&tree.name)
    );
    out.push_str("<ul>\n");
    write_html_folder(&mut out, tree, settings);
    out.push_str("</ul>\n");
    if settings.add_footer {
        let _ = writeln!(out, "<p>{}</p>", escape_html(&summary(tree, settings)));
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn write_html_folder(out: &mut String, folder: &FolderInfo, settings: &IndexerSettings) {
    let _ = write!(out, "<li><strong>{}</strong>", escape_html(&folder.name));
    if settings.show_sizes {
        let _ = write!(out, " <em>{}</em>", format_size(folder.size, settings.binary_units));
    }

    if folder.folders.is_empty() && folder.files.is_empty() {
        out.push_str("</li>\n");
        return;
    }

    out.push_str("\n<ul>\n");
    for child in &folder.folders {
        write_html_folder(out, child, settings);
    }
    for file in &folder.files {
        let _ = write!(out, "<li>{}", escape_html(&file.name));
        if settings.show_sizes {
            let _ = write!(out, " <em>{}</em>", format_size(file.size, settings.binary_units));
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n</li>\n");
}
