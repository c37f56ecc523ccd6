use fds::cache::HashCache;
use fds::matching::{FinderConfig, FinderError, MatchFinder};
use fds::scanner::ScanError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn no_cache(dir: &TempDir) -> HashCache {
    HashCache::load(&dir.path().join("hashes.json"), false).unwrap()
}

#[test]
fn test_same_content_is_found() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "src/a.txt", b"hello");
    let b = write(dir.path(), "dst/b.txt", b"hello");

    let result = MatchFinder::with_defaults()
        .find_matches(&[a.clone()], &[b], &no_cache(&dir))
        .unwrap();

    assert_eq!(result.found, vec![a]);
    assert!(result.missing.is_empty());
}

#[test]
fn test_different_type_is_pruned_even_with_same_bytes() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "src/a.jpg", b"\xff\xd8\xff pixels");
    let b = write(dir.path(), "dst/b.png", b"\xff\xd8\xff pixels");

    let result = MatchFinder::with_defaults()
        .find_matches(&[a.clone()], &[b.clone()], &no_cache(&dir))
        .unwrap();

    assert!(result.found.is_empty());
    assert_eq!(result.missing, vec![a]);
    assert_eq!(result.summary.targets_pruned, 1);
    assert_eq!(result.summary.targets_hashed, 0);
    assert!(!result.digests.contains_key(&b));
}

#[test]
fn test_type_synonyms_are_compared() {
    let dir = tempdir().unwrap();
    let x = write(dir.path(), "src/x.jpeg", b"same photo");
    let y = write(dir.path(), "dst/y.jpg", b"same photo");

    let result = MatchFinder::with_defaults()
        .find_matches(&[x.clone()], &[y], &no_cache(&dir))
        .unwrap();

    assert_eq!(result.found, vec![x]);
}

#[test]
fn test_hidden_source_files_are_skipped() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    write(&src, ".hidden.txt", b"secret");
    let visible = write(&src, "visible.txt", b"plain");

    let result = MatchFinder::with_defaults()
        .find_matches(&[src], &[], &no_cache(&dir))
        .unwrap();

    assert_eq!(result.summary.source_files, 1);
    assert_eq!(result.missing, vec![visible]);
}

#[test]
fn test_mixed_directory_tree() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("card");
    let dst = dir.path().join("archive");
    let a = write(&src, "DCIM/a.jpg", b"photo a");
    let b = write(&src, "DCIM/b.jpg", b"photo b");
    let c = write(&src, "notes.txt", b"note");
    write(&dst, "2024/a-copy.jpg", b"photo a");
    write(&dst, "2024/other.jpg", b"different");
    write(&dst, "docs/notes.txt", b"note");
    write(&dst, "music/song.mp3", b"la la la");

    let finder = MatchFinder::new(FinderConfig::default().with_io_threads(3));
    let result = finder
        .find_matches(&[src], &[dst], &no_cache(&dir))
        .unwrap();

    let mut found = result.found.clone();
    found.sort();
    let mut expected = vec![a, c];
    expected.sort();
    assert_eq!(found, expected);
    assert_eq!(result.missing, vec![b]);
    assert_eq!(result.summary.target_files, 4);
    assert_eq!(result.summary.targets_pruned, 1);
    assert_eq!(result.summary.targets_hashed, 3);
}

#[test]
fn test_every_source_classified_once() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    for i in 0..20 {
        write(&src, &format!("f{i}.dat"), format!("content {}", i % 7).as_bytes());
    }
    let target = write(dir.path(), "dst/t.dat", b"content 3");

    let result = MatchFinder::with_defaults()
        .find_matches(&[src], &[target], &no_cache(&dir))
        .unwrap();

    assert_eq!(result.found.len() + result.missing.len(), 20);
    assert_eq!(result.found.len(), 3);
    for path in &result.found {
        assert!(!result.missing.contains(path));
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    write(&src, "a.txt", b"one");
    write(&src, "b.txt", b"two");
    let dst = write(dir.path(), "dst/a.txt", b"one");

    let finder = MatchFinder::with_defaults();
    let cache = no_cache(&dir);
    let first = finder.find_matches(&[src.clone()], &[dst.clone()], &cache).unwrap();
    let second = finder.find_matches(&[src], &[dst], &cache).unwrap();

    assert_eq!(first.found, second.found);
    assert_eq!(first.missing, second.missing);
    assert_eq!(first.digests, second.digests);
    assert_eq!(first.summary.bytes_hashed, second.summary.bytes_hashed);
}

#[test]
fn test_duplicate_source_arguments_are_classified_once() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x");

    let result = MatchFinder::with_defaults()
        .find_matches(&[a.clone(), a.clone()], &[], &no_cache(&dir))
        .unwrap();

    assert_eq!(result.summary.source_files, 2);
    assert_eq!(result.summary.unique_sources, 1);
    assert_eq!(result.missing, vec![a]);
}

#[test]
fn test_empty_targets_make_everything_missing() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x");
    let b = write(dir.path(), "b.txt", b"y");

    let result = MatchFinder::with_defaults()
        .find_matches(&[a.clone(), b.clone()], &[], &no_cache(&dir))
        .unwrap();

    assert!(result.found.is_empty());
    assert_eq!(result.missing, vec![a, b]);
}

#[test]
fn test_nonexistent_input_is_an_error() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x");

    let err = MatchFinder::with_defaults()
        .find_matches(&[a], &[dir.path().join("nope")], &no_cache(&dir))
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotFound(_))));
}

#[test]
fn test_shutdown_interrupts_run() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = MatchFinder::new(FinderConfig::default().with_shutdown_flag(flag));
    let err = finder
        .find_matches(&[a], &[], &no_cache(&dir))
        .unwrap_err();

    assert!(matches!(err, FinderError::Interrupted));
}
