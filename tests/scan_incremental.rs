mod common;

use std::error::Error;
use std::fs;

use tempfile::tempdir;

use assetpipe::cache::{CacheStore, FileCacheStore};
use assetpipe::errors::PipelineError;
use assetpipe::exec::{BuildJob, BuildQueue, BuildReport};
use assetpipe::registry::AssetRegistry;

use crate::common::{default_registry, init_tracing, write_file};

type TestResult = Result<(), Box<dyn Error>>;

/// Drain the registry's outdated set through a small worker pool and commit
/// fingerprints for everything that built, mirroring the driver.
fn build_and_commit(
    registry: &AssetRegistry,
    cache: &mut dyn CacheStore,
) -> Result<BuildReport, Box<dyn Error>> {
    let mut queue = BuildQueue::new();
    registry.queue_build(&mut queue);
    let report = queue.execute(2)?;
    registry.commit_built(cache, &report)?;
    Ok(report)
}

#[test]
fn first_scan_registers_new_asset_and_flags_it_outdated() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("textures/stone.png"), "pixels");

    let cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);
    registry.scan(&cache)?;

    assert_eq!(registry.asset_count(), 1);
    assert_eq!(registry.outdated().len(), 1);

    // The sidecar was persisted immediately when the identity was minted.
    assert!(source.join("textures/stone.png.meta").is_file());

    Ok(())
}

#[test]
fn rescan_of_unchanged_tree_is_clean() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("stone.png"), "pixels");
    write_file(&source.join("models/crate.obj"), "vertices");

    let mut cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);

    registry.scan(&cache)?;
    assert_eq!(registry.outdated().len(), 2);
    let report = build_and_commit(&registry, &mut cache)?;
    assert!(report.is_success());

    // Artifacts exist at output/shard/id for every built asset.
    for entry in registry.outdated() {
        let id = entry.asset.id();
        assert!(output.join(id.output_rel_path()).is_file());
    }

    registry.scan(&cache)?;
    assert_eq!(
        registry.outdated().len(),
        0,
        "second scan of an unchanged tree must flag nothing"
    );

    Ok(())
}

#[test]
fn editing_one_file_reflags_only_that_asset() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("a.png"), "aaaa");
    write_file(&source.join("b.png"), "bbbb");

    let mut cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);

    registry.scan(&cache)?;
    build_and_commit(&registry, &mut cache)?;

    // Mutate only the bytes of `a.png`; its sidecar stays untouched.
    write_file(&source.join("a.png"), "AAAA");

    registry.scan(&cache)?;
    let flagged: Vec<_> = registry
        .outdated()
        .iter()
        .map(|entry| entry.asset.rel_path().to_path_buf())
        .collect();
    assert_eq!(flagged, vec![std::path::PathBuf::from("a.png")]);

    Ok(())
}

#[test]
fn missing_output_artifact_reflags_asset() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("stone.png"), "pixels");

    let mut cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);

    registry.scan(&cache)?;
    build_and_commit(&registry, &mut cache)?;
    let id = registry.outdated()[0].asset.id();

    // Delete only the produced artifact; fingerprints are unchanged.
    fs::remove_file(output.join(id.output_rel_path()))?;

    registry.scan(&cache)?;
    assert_eq!(registry.outdated().len(), 1);
    assert_eq!(registry.outdated()[0].asset.id(), id);

    Ok(())
}

#[test]
fn failed_build_leaves_asset_stale_for_next_scan() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("stone.png"), "pixels");

    let mut cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);

    registry.scan(&cache)?;
    assert_eq!(registry.outdated().len(), 1);
    let id = registry.outdated()[0].asset.id();

    // Simulate an importer failure instead of running the real job.
    let mut queue = BuildQueue::new();
    queue.push(BuildJob::new(id, "stone.png [texture]", || {
        Err(anyhow::anyhow!("conversion exploded"))
    }));
    let report = queue.execute(1)?;
    assert!(!report.is_success());

    let committed = registry.commit_built(&mut cache, &report)?;
    assert_eq!(committed, 0, "failed assets must not commit fingerprints");

    registry.scan(&cache)?;
    assert_eq!(
        registry.outdated().len(),
        1,
        "the asset must stay outdated after a failed build"
    );
    assert_eq!(registry.outdated()[0].asset.id(), id);

    Ok(())
}

#[test]
fn unparsable_sidecar_recreates_the_asset() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("stone.png"), "pixels");
    write_file(&source.join("stone.png.meta"), "this is ] not [ toml");

    let cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);
    registry.scan(&cache)?;

    assert_eq!(registry.asset_count(), 1);
    assert_eq!(registry.outdated().len(), 1);

    // The broken document was rewritten; a second scan reloads it cleanly
    // and keeps the re-minted identity.
    let id = registry.outdated()[0].asset.id();
    registry.scan(&cache)?;
    assert_eq!(registry.outdated()[0].asset.id(), id);

    Ok(())
}

#[test]
fn files_without_a_matching_rule_are_skipped() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join("notes.txt"), "not an asset");

    let cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);
    registry.scan(&cache)?;

    assert_eq!(registry.asset_count(), 0);
    assert_eq!(registry.outdated().len(), 0);
    assert!(
        !source.join("notes.txt.meta").exists(),
        "skipped files must not grow sidecars"
    );

    Ok(())
}

#[test]
fn hidden_files_and_directories_are_skipped() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");
    write_file(&source.join(".thumbnail.png"), "hidden");
    write_file(&source.join(".git/blob.png"), "hidden dir");
    write_file(&source.join("visible.png"), "pixels");

    let cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);
    registry.scan(&cache)?;

    assert_eq!(registry.asset_count(), 1);
    assert_eq!(
        registry.outdated()[0].asset.rel_path(),
        std::path::Path::new("visible.png")
    );

    Ok(())
}

#[test]
fn duplicate_identity_is_fatal() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");

    let sidecar = concat!(
        "id = \"3f2a9c01d2e44b7a8c1fb02a6de91c55\"\n",
        "\n",
        "[importers.texture]\n",
        "quality = \"hd\"\n",
        "compression = \"disabled\"\n",
    );

    write_file(&source.join("a.png"), "aaaa");
    write_file(&source.join("a.png.meta"), sidecar);
    write_file(&source.join("b.png"), "bbbb");
    write_file(&source.join("b.png.meta"), sidecar);

    let cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);

    match registry.scan(&cache) {
        Err(PipelineError::DuplicateAsset(_)) => Ok(()),
        other => panic!("expected DuplicateAsset error, got {other:?}"),
    }
}

#[test]
fn unknown_importer_kind_in_sidecar_is_fatal() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("output");

    write_file(&source.join("a.png"), "aaaa");
    write_file(
        &source.join("a.png.meta"),
        "id = \"3f2a9c01d2e44b7a8c1fb02a6de91c55\"\n\n[importers.wavefront]\n",
    );

    let cache = FileCacheStore::new(dir.path().join("cache/fingerprints"));
    let mut registry = default_registry(&source, &output);

    match registry.scan(&cache) {
        Err(PipelineError::UnknownImporter(kind)) => {
            assert_eq!(kind, "wavefront");
            Ok(())
        }
        other => panic!("expected UnknownImporter error, got {other:?}"),
    }
}
