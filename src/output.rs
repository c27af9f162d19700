//! Report path derivation.
//!
//! The report name embeds the full path of the indexed folder, so folders
//! sharing one custom output directory still get distinct file names:
//!
//! ```text
//! PerFolder        /data/x  ->  /data/x/" data x Index.txt"
//! CustomDirectory  /data/x  ->  /out/" data x Index.txt"
//! ```
//!
//! Separators and spaces both become a space, so distinct folders can still
//! share a name: `/data/a b` and `/data/a/b` both map to `" data a b Index.txt"`.
//! The orchestrator warns when that happens within one run and the later
//! report wins.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::Config;

/// Replacement for characters that cannot appear in a file name.
pub const NAME_SEPARATOR: char = ' ';

/// True for characters rejected in file names on at least one supported
/// platform: `< > : " / \ | ? *` and control characters.
#[inline]
#[must_use]
pub const fn is_invalid_name_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch.is_ascii_control()
}

/// Replace every invalid character with exactly one [`NAME_SEPARATOR`].
///
/// Total and deterministic: no trimming, no collapsing of runs.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> String {
    raw.chars().map(|ch| if is_invalid_name_char(ch) { NAME_SEPARATOR } else { ch }).collect()
}

/// Report file name for `folder`.
#[must_use]
pub fn index_file_name(config: &Config, folder: &Path, today: NaiveDate) -> String {
    let raw = format!(
        "{}{NAME_SEPARATOR}{}.{}",
        folder.display(),
        config.file_name,
        config.indexer_settings.output.extension()
    );
    let name = sanitize_file_name(&raw);

    if config.prepend_date {
        format!("{} {name}", today.format("%Y-%m-%d"))
    } else {
        name
    }
}

/// Where the report for `folder` should be written, or `None` to skip it.
///
/// `None` means the index directory does not exist; the caller writes
/// nothing and raises no error.
#[must_use]
pub fn resolve(config: &Config, folder: &Path, today: NaiveDate) -> Option<PathBuf> {
    let index_dir = config.index_dir(folder);

    if !index_dir.is_dir() {
        tracing::debug!(
            folder = %folder.display(),
            index_dir = %index_dir.display(),
            "Index directory missing, skipping"
        );
        return None;
    }

    Some(index_dir.join(index_file_name(config, folder, today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputMode, ReportFormat};
    use std::fs;
    use tempfile::tempdir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_sanitize_replaces_each_invalid_char_with_one_space() {
        assert_eq!(sanitize_file_name("/data/x Index.txt"), " data x Index.txt");
        assert_eq!(sanitize_file_name(r"C:\Users\me"), "C  Users me");
        assert_eq!(sanitize_file_name("a<>b"), "a  b");
        assert_eq!(sanitize_file_name("q?*|\""), "q    ");
        assert_eq!(sanitize_file_name("tab\there\nnl\u{7f}"), "tab here nl ");
    }

    #[test]
    fn test_sanitize_keeps_valid_characters() {
        let name = "Ünïcödé folder (1) [x] #2 & more.txt";
        assert_eq!(sanitize_file_name(name), name);
        assert_eq!(sanitize_file_name(""), "");
    }

    #[test]
    fn test_sanitize_is_total_on_odd_input() {
        let raw: String = (0u8..128).map(char::from).collect();
        let clean = sanitize_file_name(&raw);
        assert_eq!(clean.chars().count(), raw.chars().count());
        assert!(!clean.chars().any(is_invalid_name_char));
    }

    #[test]
    fn test_index_file_name_embeds_dir_template_and_extension() {
        let mut config = Config::default();
        config.indexer_settings.output = ReportFormat::Html;
        let name = index_file_name(&config, Path::new("/data/x"), day());
        assert_eq!(name, " data x Index.html");
    }

    #[test]
    fn test_index_file_name_prepends_date_after_sanitizing() {
        let config = Config { prepend_date: true, file_name: "a:b".into(), ..Default::default() };
        let name = index_file_name(&config, Path::new("/d"), day());
        assert_eq!(name, "2024-03-09  d a b.txt");
    }

    #[test]
    fn test_resolve_per_folder() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("x");
        fs::create_dir(&folder).unwrap();

        let config = Config::default();
        let path = resolve(&config, &folder, day()).unwrap();
        assert_eq!(path.parent().unwrap(), folder);
        let expected = sanitize_file_name(&format!("{} Index.txt", folder.display()));
        assert_eq!(path.file_name().unwrap().to_string_lossy(), expected);
    }

    #[test]
    fn test_resolve_missing_dir_is_none() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        let config = Config { prepend_date: true, ..Default::default() };
        assert!(resolve(&config, &missing, day()).is_none());
    }

    #[test]
    fn test_resolve_missing_custom_dir_is_none_for_every_folder() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("x");
        fs::create_dir(&folder).unwrap();
        let config = Config {
            output_mode: OutputMode::CustomDirectory,
            custom_directory: dir.path().join("no-such-out"),
            ..Default::default()
        };
        assert!(resolve(&config, &folder, day()).is_none());
        assert!(resolve(&config, dir.path(), day()).is_none());
    }

    #[test]
    fn test_resolve_per_folder_ignores_custom_dir() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("x");
        fs::create_dir(&folder).unwrap();
        let config =
            Config { custom_directory: dir.path().join("no-such-out"), ..Default::default() };
        assert!(resolve(&config, &folder, day()).is_some());
    }

    #[test]
    fn test_resolve_custom_dir_distinct_names() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let config = Config {
            output_mode: OutputMode::CustomDirectory,
            custom_directory: out.clone(),
            ..Default::default()
        };

        let a = resolve(&config, Path::new("/data/x"), day()).unwrap();
        let b = resolve(&config, Path::new("/data/y"), day()).unwrap();
        assert_eq!(a.parent().unwrap(), out);
        assert_eq!(b.parent().unwrap(), out);
        assert_ne!(a, b);
    }

    #[test]
    fn test_separator_and_space_folders_share_a_name() {
        let config = Config::default();
        let spaced = index_file_name(&config, Path::new("/data/a b"), day());
        let nested = index_file_name(&config, Path::new("/data/a/b"), day());
        assert_eq!(spaced, " data a b Index.txt");
        assert_eq!(spaced, nested);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let dir = tempdir().unwrap();
        let config = Config { prepend_date: true, ..Default::default() };
        let first = resolve(&config, dir.path(), day());
        let second = resolve(&config, dir.path(), day());
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
