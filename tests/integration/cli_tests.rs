use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::error::ExitCode;
use dupesweep::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupesweep", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn path(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_scan_reports_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    let code = run(&["scan", path(dir.path()), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_without_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"one").unwrap();
    fs::write(dir.path().join("b.txt"), b"two").unwrap();

    let code = run(&["scan", path(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_missing_directory_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    assert!(run(&["scan", path(&missing)]).is_err());
}

#[test]
fn test_quiet_scan_with_unreadable_item_is_partial() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    fs::write(dir.path().join("broken.zip"), b"not a zip").unwrap();

    for format in ["text", "json", "csv"] {
        let code = run(&["scan", path(dir.path()), "--zip", "--output", format]).unwrap();
        assert_eq!(code, ExitCode::PartialSuccess, "format {format}");
    }
}

#[test]
fn test_clean_without_yes_only_previews() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    let code = run(&["clean", path(dir.path()), "--strategy", "delete"]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_clean_deletes_all_but_first() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), b"same").unwrap();
    }

    let code = run(&[
        "clean",
        path(dir.path()),
        "--strategy",
        "delete",
        "--yes",
        "--output",
        "csv",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("c.txt").exists());
}

#[test]
fn test_clean_move_without_destination_fails_before_scanning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    let err = run(&["clean", path(dir.path()), "--strategy", "move", "--yes"]).unwrap_err();
    assert!(format!("{:#}", err).contains("destination"));
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_clean_move_into_folder() {
    let dir = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(sub.join("b.txt"), b"same").unwrap();

    let code = run(&[
        "clean",
        path(dir.path()),
        "--strategy",
        "move",
        "--dest",
        path(dest.path()),
        "--select",
        "in-folder",
        "--folder",
        path(&sub),
        "--yes",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!sub.join("b.txt").exists());
    assert!(dest.path().join("b.txt").exists());
    assert!(dir.path().join("a.txt").exists());
}

#[test]
fn test_clean_partial_failure_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    fs::write(dir.path().join("c.txt"), b"same").unwrap();

    // Every member selected: hard-linking has nothing to keep.
    let code = run(&[
        "clean",
        path(dir.path()),
        "--strategy",
        "hardlink",
        "--select",
        "under",
        "--folder",
        path(dir.path()),
        "--yes",
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert!(dir.path().join("c.txt").exists());
}

#[test]
fn test_explicit_missing_config_file_is_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("absent.toml");

    let err = run(&["--config", path(&config), "scan", path(dir.path())]).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_config_file_supplies_filter() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), b"same").unwrap();
    fs::write(data.join("b.txt"), b"same").unwrap();

    let config = dir.path().join("config.toml");
    fs::write(&config, "extensions = [\"jpg\"]\n").unwrap();

    let code = run(&["--config", path(&config), "scan", path(&data)]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    // The command line wins over the file.
    let code = run(&[
        "--config",
        path(&config),
        "scan",
        path(&data),
        "--ext",
        "txt",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}
