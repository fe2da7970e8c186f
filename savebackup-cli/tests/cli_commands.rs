use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;

use savebackup_core::BackupOptions;
use tempfile::TempDir;

fn savebackup_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("savebackup"));
    cmd.env("HOME", home).env("USERPROFILE", home);
    cmd
}

fn write_config(home: &Path, yaml: &str) {
    let dir = home.join(".SaveBackup");
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join("config.yaml"), yaml).expect("write config");
}

#[cfg(unix)]
#[test]
fn preview_prints_mirrored_destination_under_default_root() {
    let home = TempDir::new().expect("home");

    let expected = format!(
        "{}/.SaveBackup/w/proj/a-2024-01-02_03-04-05.txt\n",
        home.path().display()
    );

    savebackup_cmd(home.path())
        .args(["preview", "/w/proj/a.txt", "--timestamp", "2024-01-02_03-04-05"])
        .assert()
        .success()
        .stdout(expected);
}

#[cfg(unix)]
#[test]
fn preview_honours_backup_root_flag_and_files_without_extension() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");

    let expected = format!(
        "{}/w/Makefile-2024-01-02_03-04-05\n",
        root.path().display()
    );

    savebackup_cmd(home.path())
        .args(["preview", "/w/Makefile", "--timestamp", "2024-01-02_03-04-05"])
        .arg("--backup-root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn preview_of_relative_path_fails() {
    let home = TempDir::new().expect("home");

    savebackup_cmd(home.path())
        .args(["preview", "notes/a.txt", "--timestamp", "2024-01-02_03-04-05"])
        .assert()
        .failure()
        .stderr(contains("cannot derive a backup path"))
        .stderr(contains("path is not absolute"));
}

#[test]
fn config_prints_defaults_when_no_file_exists() {
    let home = TempDir::new().expect("home");

    let output = savebackup_cmd(home.path())
        .arg("config")
        .output()
        .expect("run config");
    assert!(output.status.success());

    let options: BackupOptions =
        serde_yaml::from_slice(&output.stdout).expect("config output is YAML");
    assert_eq!(options.minimum_interval_millis, 1000);
    assert_eq!(options.backup_root, home.path().join(".SaveBackup"));
    assert!(options.watch.is_empty());
}

#[test]
fn config_reflects_file_and_flag_overrides() {
    let home = TempDir::new().expect("home");
    write_config(home.path(), "minimum_interval_millis: 250\nwatch:\n  - /srv/notes\n");

    let output = savebackup_cmd(home.path())
        .args(["config", "--interval-ms", "75"])
        .output()
        .expect("run config");
    assert!(output.status.success());

    let options: BackupOptions =
        serde_yaml::from_slice(&output.stdout).expect("config output is YAML");
    assert_eq!(options.minimum_interval_millis, 75);
    assert_eq!(options.watch, vec![Path::new("/srv/notes").to_path_buf()]);
}

#[test]
fn malformed_config_is_reported() {
    let home = TempDir::new().expect("home");
    write_config(home.path(), "minimum_interval_millis: [not, a, number]\n");

    savebackup_cmd(home.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(contains("failed to load config"));
}
