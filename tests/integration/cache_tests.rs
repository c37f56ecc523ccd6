use fds::cache::{CacheError, CacheMode, HashCache};
use fds::matching::MatchFinder;
use fds::scanner::Digest;
use std::collections::HashMap;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cache_initial_run_writes_file() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("hashes.json");
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();

    let cache = HashCache::load(&cache_path, true).unwrap();
    assert_eq!(cache.mode(), CacheMode::EnabledFresh);

    let result = MatchFinder::with_defaults()
        .find_matches(&[a.clone()], &[b.clone()], &cache)
        .unwrap();
    assert_eq!(result.summary.cache_hits, 0);
    assert_eq!(result.summary.cache_misses, 2);
    assert!(cache.save(&result.digests).unwrap());

    let stored: HashMap<String, String> =
        serde_json::from_str(&fs::read_to_string(&cache_path).unwrap()).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(
        stored[a.to_str().unwrap()],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_cache_rerun_reuses_digests_without_rewriting() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("hashes.json");
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();

    let finder = MatchFinder::with_defaults();
    let first_cache = HashCache::load(&cache_path, true).unwrap();
    let first = finder
        .find_matches(&[a.clone()], &[b.clone()], &first_cache)
        .unwrap();
    first_cache.save(&first.digests).unwrap();
    let written = fs::read_to_string(&cache_path).unwrap();

    // Changing the content is not noticed: cached digests are trusted.
    fs::write(&b, "changed").unwrap();

    let second_cache = HashCache::load(&cache_path, true).unwrap();
    assert_eq!(second_cache.mode(), CacheMode::EnabledExisting);
    let second = finder
        .find_matches(&[a.clone()], &[b], &second_cache)
        .unwrap();

    assert_eq!(second.found, vec![a]);
    assert_eq!(second.summary.cache_hits, 2);
    assert_eq!(second.summary.bytes_hashed, 0);

    assert!(!second_cache.save(&second.digests).unwrap());
    assert_eq!(fs::read_to_string(&cache_path).unwrap(), written);
}

#[test]
fn test_cache_disabled_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("hashes.json");
    fs::write(&cache_path, r#"{"/stale/path":"00"}"#).unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, "").unwrap();

    let cache = HashCache::load(&cache_path, false).unwrap();
    assert!(cache.is_empty());
    let result = MatchFinder::with_defaults()
        .find_matches(&[a.clone()], &[], &cache)
        .unwrap();
    assert!(cache.save(&result.digests).unwrap());

    let stored: HashMap<String, Digest> =
        serde_json::from_str(&fs::read_to_string(&cache_path).unwrap()).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored.contains_key("/stale/path"));
    assert_eq!(
        stored[a.to_str().unwrap()].as_str(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_malformed_cache_is_fatal() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("hashes.json");
    fs::write(&cache_path, "{ not json").unwrap();

    let err = HashCache::load(&cache_path, true).unwrap_err();
    assert!(matches!(err, CacheError::Malformed { .. }));
    assert!(err.to_string().contains("hashes.json"));
}

#[test]
fn test_malformed_cache_ignored_when_disabled() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("hashes.json");
    fs::write(&cache_path, "[1, 2, 3]").unwrap();

    let cache = HashCache::load(&cache_path, false).unwrap();
    assert_eq!(cache.mode(), CacheMode::Disabled);
}
