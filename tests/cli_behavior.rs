/// End-to-end tests for the treeidx subcommands and exit codes.
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn treeidx(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("treeidx"));
    cmd.env_remove("TREEIDX_CONFIG").env_remove("RUST_LOG").arg("--config").arg(config);
    cmd
}

#[test]
fn test_new_creates_empty_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nested").join("list.tgcj");

    treeidx(&config).arg("new").assert().success().stdout(predicate::str::contains("Created"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(value["folders"], serde_json::json!([]));
    assert_eq!(value["output_mode"], "per_folder");
}

#[test]
fn test_new_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");
    treeidx(&config).arg("new").assert().success();

    treeidx(&config).arg("new").assert().code(2);
    treeidx(&config).arg("new").arg("--force").assert().success();
}

#[test]
fn test_add_show_remove_round_trip() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();

    treeidx(&config)
        .arg("add")
        .arg(&a)
        .arg(&b)
        .arg(&a)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 3 folder(s)"));

    treeidx(&config)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Folders:          3"));

    treeidx(&config)
        .arg("remove")
        .arg(&a)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 folder(s)"));

    let output = treeidx(&config).arg("show").arg("--format").arg("json").output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["folders"].as_array().unwrap().len(), 1);
    assert_eq!(value["folders"][0], b.display().to_string());
}

#[test]
fn test_add_existing_only_drops_missing_paths() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");

    treeidx(&config)
        .arg("add")
        .arg("--existing-only")
        .arg(dir.path())
        .arg(dir.path().join("ghost"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 1 folder(s)"));
}

#[test]
fn test_move_up_and_down() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");
    let a = dir.path().join("a");
    let b = dir.path().join("b");

    treeidx(&config).arg("add").arg(&a).arg(&b).assert().success();
    treeidx(&config)
        .arg("move-up")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved folder 1 up"));
    treeidx(&config)
        .arg("move-down")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot move down"));

    let output = treeidx(&config).arg("show").arg("--format").arg("json").output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["folders"][0], b.display().to_string());
    assert_eq!(value["folders"][1], a.display().to_string());
}

#[test]
fn test_set_updates_settings() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");

    treeidx(&config)
        .arg("set")
        .arg("--format")
        .arg("html")
        .arg("--prepend-date")
        .arg("true")
        .arg("--max-depth")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 3 setting(s)"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(value["prepend_date"], true);
    assert_eq!(value["indexer_settings"]["output"], "html");
    assert_eq!(value["indexer_settings"]["max_depth"], 3);
}

#[test]
fn test_set_rejects_file_name_with_separator() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");

    treeidx(&config).arg("set").arg("--file-name").arg("a/b").assert().failure();
    assert!(!config.exists());
}

#[test]
fn test_config_path_requires_extension() {
    let dir = tempdir().unwrap();
    treeidx(&dir.path().join("list.json"))
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".tgcj"));
}

#[test]
fn test_config_from_environment() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("env.tgcj");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("treeidx"));
    cmd.env("TREEIDX_CONFIG", &config).arg("new").assert().success();
    assert!(config.exists());
}

#[test]
fn test_show_missing_config_exits_no_input() {
    let dir = tempdir().unwrap();
    treeidx(&dir.path().join("absent.tgcj")).arg("show").assert().code(4);
}

#[test]
fn test_show_malformed_config_exits_data_err() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.tgcj");
    fs::write(&config, "{ not json").unwrap();

    treeidx(&config).arg("show").assert().code(2);
}

#[test]
fn test_index_writes_and_skips() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");
    let project = dir.path().join("project");
    fs::create_dir(&project).unwrap();
    fs::write(project.join("lib.rs"), "pub fn f() {}").unwrap();
    let gone = dir.path().join("gone");

    treeidx(&config).arg("add").arg(&project).arg(&gone).assert().success();

    treeidx(&config)
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("written  "))
        .stdout(predicate::str::contains("skipped  "))
        .stdout(predicate::str::contains("(empty report)"));

    let reports: Vec<_> = fs::read_dir(&project)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with("Index.txt"))
        .collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn test_resolve_prints_report_path() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");
    let project = dir.path().join("project");
    fs::create_dir(&project).unwrap();

    treeidx(&config).arg("new").assert().success();
    treeidx(&config)
        .arg("resolve")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains(" Index.txt"));

    treeidx(&config)
        .arg("resolve")
        .arg(dir.path().join("missing"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("skip:"));
}

#[test]
fn test_quiet_suppresses_status_output() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");

    treeidx(&config).arg("--quiet").arg("new").assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn test_set_custom_dir_is_stored_absolute() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");

    treeidx(&config)
        .current_dir(dir.path())
        .arg("set")
        .arg("--output-mode")
        .arg("custom-directory")
        .arg("--custom-dir")
        .arg("reports")
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    let stored = value["custom_directory"].as_str().unwrap();
    assert!(Path::new(stored).is_absolute(), "expected absolute path, got {stored}");
    assert!(Path::new(stored).ends_with("reports"));
}

#[test]
fn test_move_down_huge_index_is_noop() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("list.tgcj");

    treeidx(&config).arg("add").arg(dir.path().join("a")).arg(dir.path().join("b")).assert().success();
    treeidx(&config)
        .arg("move-down")
        .arg(usize::MAX.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot move down"));
}
