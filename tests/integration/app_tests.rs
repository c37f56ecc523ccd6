use clap::Parser;
use fds::cli::Cli;
use fds::error::ExitCode;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(dir: &Path, extra: &[&str]) -> Cli {
    let cache = dir.join("hashes.json");
    let config = dir.join("config.toml");
    let mut args = vec![
        "fds".to_string(),
        "--quiet".to_string(),
        "--no-color".to_string(),
        "--cache".to_string(),
        cache.to_string_lossy().into_owned(),
        "--config".to_string(),
        config.to_string_lossy().into_owned(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_run_app_copies_missing_and_writes_cache() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    let stage = dir.path().join("stage");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("kept.txt"), "kept").unwrap();
    fs::write(src.join("new.txt"), "new").unwrap();
    fs::write(dst.join("kept-copy.txt"), "kept").unwrap();

    let code = fds::run_app(cli(
        dir.path(),
        &[
            src.to_str().unwrap(),
            "-t",
            dst.to_str().unwrap(),
            "--copy",
            "--staging-dir",
            stage.to_str().unwrap(),
            "--io-threads",
            "1",
        ],
    ))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_to_string(stage.join("new.txt")).unwrap(), "new");
    assert!(!stage.join("kept.txt").exists());

    let stored: HashMap<String, String> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("hashes.json")).unwrap())
            .unwrap();
    assert_eq!(stored.len(), 3);
}

#[test]
fn test_run_app_missing_input_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = fds::run_app(cli(dir.path(), &[missing.to_str().unwrap()])).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("nope"));
}

#[test]
fn test_run_app_malformed_cache_with_memory_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("hashes.json"), "garbage").unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, "a").unwrap();

    let err = fds::run_app(cli(dir.path(), &[a.to_str().unwrap(), "-m", "-o", "json"]))
        .unwrap_err();

    assert!(err.to_string().contains("Malformed hash cache"));
    assert_eq!(
        fs::read_to_string(dir.path().join("hashes.json")).unwrap(),
        "garbage"
    );
}
