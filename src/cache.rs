// src/cache.rs

//! Persistent fingerprint cache.
//!
//! The cache remembers, per asset identity, the fingerprints last observed
//! for the sidecar document and the raw file contents. The store sits
//! behind a minimal key-value trait so the storage engine is swappable
//! without touching scan or build logic.
//!
//! The store is only ever accessed from the scanning/driver thread. It is
//! not synchronized and must not be handed to build workers.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::asset::AssetId;

/// Default cache location, relative to the source root.
pub const DEFAULT_CACHE_PATH: &str = ".assetpipe/cache";

/// Last-observed fingerprints for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprints {
    /// Digest of the sidecar document.
    pub meta: String,
    /// Digest of the raw source file contents.
    pub file: String,
}

/// Abstract storage for asset fingerprints.
pub trait CacheStore: Send {
    fn lookup(&self, id: &AssetId) -> Result<Option<Fingerprints>>;

    /// Record `fingerprints` for `id` and report whether anything changed.
    ///
    /// An absent row is inserted and reported as changed: the first
    /// observation counts as a change so the asset is built at least once.
    /// A present row is compared field by field; any difference overwrites
    /// and reports changed.
    fn update(&mut self, id: &AssetId, fingerprints: &Fingerprints) -> Result<bool>;
}

/// Stores fingerprints in a single file, lazily created on first write.
#[derive(Debug)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileCacheStore {
    fn lookup(&self, id: &AssetId) -> Result<Option<Fingerprints>> {
        let map = load_all(&self.path)?;
        Ok(map.get(&id.to_string()).cloned())
    }

    fn update(&mut self, id: &AssetId, fingerprints: &Fingerprints) -> Result<bool> {
        let mut map = load_all(&self.path)?;
        let key = id.to_string();

        if map.get(&key) == Some(fingerprints) {
            return Ok(false);
        }

        map.insert(key, fingerprints.clone());
        save_all(&self.path, &map)?;
        debug!(asset = %id, "stored fingerprints (file)");
        Ok(true)
    }
}

/// Stores fingerprints in memory only, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    map: HashMap<String, Fingerprints>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn lookup(&self, id: &AssetId) -> Result<Option<Fingerprints>> {
        Ok(self.map.get(&id.to_string()).cloned())
    }

    fn update(&mut self, id: &AssetId, fingerprints: &Fingerprints) -> Result<bool> {
        let key = id.to_string();
        if self.map.get(&key) == Some(fingerprints) {
            return Ok(false);
        }
        self.map.insert(key, fingerprints.clone());
        debug!(asset = %id, "stored fingerprints (memory)");
        Ok(true)
    }
}

/// Load every cache row. A missing file is an empty cache, not an error.
///
/// Rows are whitespace-separated: `id meta_fingerprint file_fingerprint`.
/// Malformed lines are skipped.
fn load_all(path: &Path) -> Result<HashMap<String, Fingerprints>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let file = File::open(path).with_context(|| format!("opening cache file at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();

    for line_res in reader.lines() {
        let line = line_res?;
        let mut parts = line.split_whitespace();
        if let (Some(id), Some(meta), Some(file_fp)) = (parts.next(), parts.next(), parts.next()) {
            map.insert(
                id.to_string(),
                Fingerprints {
                    meta: meta.to_string(),
                    file: file_fp.to_string(),
                },
            );
        }
    }

    Ok(map)
}

/// Persist every cache row, creating the containing directories on demand.
fn save_all(path: &Path, map: &HashMap<String, Fingerprints>) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache directory at {:?}", parent))?;
        }
        _ => {}
    }

    let file = File::create(path).with_context(|| format!("creating cache file at {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for (id, fp) in map.iter() {
        writeln!(writer, "{} {} {}", id, fp.meta, fp.file)?;
    }

    writer.flush()?;
    Ok(())
}
