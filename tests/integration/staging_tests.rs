use fds::cache::HashCache;
use fds::matching::MatchFinder;
use fds::staging::{StagingCopier, StagingError};
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_copy_missing_preserves_relative_layout() {
    let dir = tempdir().unwrap();
    let card = dir.path().join("card");
    let archive = dir.path().join("archive");
    let stage = dir.path().join("stage");
    fs::create_dir_all(card.join("DCIM/100")).unwrap();
    fs::create_dir_all(card.join("DCIM/101")).unwrap();
    fs::create_dir_all(&archive).unwrap();
    fs::write(card.join("DCIM/100/a.jpg"), "a").unwrap();
    fs::write(card.join("DCIM/101/b.jpg"), "b").unwrap();
    fs::write(card.join("DCIM/101/c.jpg"), "c").unwrap();
    fs::write(archive.join("c.jpg"), "c").unwrap();

    let cache = HashCache::load(&dir.path().join("hashes.json"), false).unwrap();
    let result = MatchFinder::with_defaults()
        .find_matches(&[card], &[archive], &cache)
        .unwrap();
    assert_eq!(result.missing.len(), 2);

    let report = StagingCopier::new(&stage)
        .copy_missing(&result.missing)
        .unwrap();

    assert_eq!(report.copied.len(), 2);
    assert_eq!(report.bytes, 2);
    assert_eq!(fs::read_to_string(stage.join("100/a.jpg")).unwrap(), "a");
    assert_eq!(fs::read_to_string(stage.join("101/b.jpg")).unwrap(), "b");
    assert!(!stage.join("101/c.jpg").exists());
}

#[test]
fn test_copy_single_file_lands_in_staging_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("photos/only.jpg");
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, "only").unwrap();
    let stage = dir.path().join("stage");

    let report = StagingCopier::new(&stage)
        .copy_missing(&[file])
        .unwrap();

    assert_eq!(report.copied, vec![stage.join("only.jpg")]);
    assert_eq!(fs::read_to_string(stage.join("only.jpg")).unwrap(), "only");
}

#[test]
fn test_copy_overwrites_existing_destination() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let a = src.join("a.txt");
    let b = src.join("b.txt");
    fs::write(&a, "new a").unwrap();
    fs::write(&b, "new b").unwrap();
    let stage = dir.path().join("stage");
    fs::create_dir_all(&stage).unwrap();
    fs::write(stage.join("a.txt"), "old").unwrap();

    StagingCopier::new(&stage).copy_missing(&[a, b]).unwrap();

    assert_eq!(fs::read_to_string(stage.join("a.txt")).unwrap(), "new a");
}

#[test]
fn test_copy_nothing_creates_nothing() {
    let dir = tempdir().unwrap();
    let stage = dir.path().join("stage");

    let report = StagingCopier::new(&stage).copy_missing(&[]).unwrap();

    assert!(report.copied.is_empty());
    assert!(!stage.exists());
}

#[test]
fn test_copy_vanished_source_fails() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("gone.txt");
    let stage = dir.path().join("stage");

    let err = StagingCopier::new(&stage).copy_missing(&[gone]).unwrap_err();
    assert!(matches!(err, StagingError::Io { .. }));
}

#[test]
fn test_copy_interrupted() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, "a").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let err = StagingCopier::new(dir.path().join("stage"))
        .with_shutdown_flag(flag)
        .copy_missing(&[a])
        .unwrap_err();
    assert!(matches!(err, StagingError::Interrupted));
}
