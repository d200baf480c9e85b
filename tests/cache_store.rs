mod common;

use std::error::Error;

use tempfile::tempdir;

use assetpipe::asset::AssetId;
use assetpipe::cache::{CacheStore, FileCacheStore, Fingerprints, MemoryCacheStore};

use crate::common::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn fingerprints(meta: &str, file: &str) -> Fingerprints {
    Fingerprints {
        meta: meta.to_string(),
        file: file.to_string(),
    }
}

fn exercise_update_contract(store: &mut dyn CacheStore) -> TestResult {
    let id = AssetId::generate();
    let first = fingerprints("m1", "f1");

    // First observation counts as a change so the asset builds at least once.
    assert_eq!(store.lookup(&id)?, None);
    assert!(store.update(&id, &first)?);

    // Same fingerprints: no change reported.
    assert!(!store.update(&id, &first)?);
    assert_eq!(store.lookup(&id)?, Some(first.clone()));

    // A single differing field overwrites and reports a change.
    let edited = fingerprints("m1", "f2");
    assert!(store.update(&id, &edited)?);
    assert_eq!(store.lookup(&id)?, Some(edited));

    Ok(())
}

#[test]
fn memory_store_follows_the_update_contract() -> TestResult {
    init_tracing();

    let mut store = MemoryCacheStore::new();
    exercise_update_contract(&mut store)
}

#[test]
fn file_store_follows_the_update_contract() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let mut store = FileCacheStore::new(dir.path().join("nested/dirs/fingerprints"));
    exercise_update_contract(&mut store)
}

#[test]
fn file_store_is_created_lazily_and_persists_rows() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("deep/cache/fingerprints");

    let id = AssetId::generate();

    {
        let mut store = FileCacheStore::new(path.clone());

        // Reading an absent store is an empty cache, not an error.
        assert_eq!(store.lookup(&id)?, None);
        assert!(!path.exists());

        store.update(&id, &fingerprints("meta", "file"))?;
        assert!(path.is_file());
    }

    // A fresh handle over the same file sees the committed row.
    let store = FileCacheStore::new(path);
    assert_eq!(store.lookup(&id)?, Some(fingerprints("meta", "file")));

    Ok(())
}

#[test]
fn rows_for_other_assets_are_untouched_by_updates() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let mut store = FileCacheStore::new(dir.path().join("fingerprints"));

    let a = AssetId::generate();
    let b = AssetId::generate();

    store.update(&a, &fingerprints("am", "af"))?;
    store.update(&b, &fingerprints("bm", "bf"))?;
    store.update(&a, &fingerprints("am2", "af2"))?;

    assert_eq!(store.lookup(&a)?, Some(fingerprints("am2", "af2")));
    assert_eq!(store.lookup(&b)?, Some(fingerprints("bm", "bf")));

    Ok(())
}
