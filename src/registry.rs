// src/registry.rs

//! Asset registry: scanning and build-queue population.
//!
//! `scan` walks the source tree once on the calling thread, resolving or
//! minting an identity for every file an importer claims, fingerprinting
//! it, and comparing against the cache store to accumulate the outdated
//! set. `queue_build` then turns the outdated set into build jobs.
//!
//! The scan only *reads* the cache. The fingerprints it computes ride on
//! each outdated entry, and [`AssetRegistry::commit_built`] writes them to
//! the store after the build, and only for assets whose jobs all succeeded, so
//! a failed importer leaves the asset stale for the next run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::asset::{sidecar, Asset, AssetId};
use crate::cache::{CacheStore, Fingerprints};
use crate::digest;
use crate::errors::{PipelineError, Result};
use crate::exec::{BuildJob, BuildQueue, BuildReport};
use crate::importer::ImporterRegistry;
use crate::rules::BuildRules;

/// An asset flagged for rebuild, with the fingerprints observed during the
/// scan (pending until the build succeeds and they are committed).
#[derive(Debug, Clone)]
pub struct OutdatedAsset {
    pub asset: Asset,
    pub fingerprints: Fingerprints,
}

/// Registry of known assets under one source root.
#[derive(Debug)]
pub struct AssetRegistry {
    source_root: PathBuf,
    output_root: PathBuf,
    rules: BuildRules,
    importers: ImporterRegistry,
    assets: HashMap<AssetId, Asset>,
    outdated: Vec<OutdatedAsset>,
}

impl AssetRegistry {
    pub fn new(
        source_root: PathBuf,
        output_root: PathBuf,
        rules: BuildRules,
        importers: ImporterRegistry,
    ) -> Self {
        Self {
            source_root,
            output_root,
            rules,
            importers,
            assets: HashMap::new(),
            outdated: Vec::new(),
        }
    }

    /// Assets flagged outdated by the last scan, in scan order.
    pub fn outdated(&self) -> &[OutdatedAsset] {
        &self.outdated
    }

    /// Number of registered assets after the last scan.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Walk the source tree once and accumulate the outdated set.
    ///
    /// Strictly single-threaded: the cache store is not synchronized and
    /// the whole scan -> fingerprint -> compare sequence runs on the
    /// calling thread.
    pub fn scan(&mut self, cache: &dyn CacheStore) -> Result<()> {
        info!(source = ?self.source_root, "scanning source tree");

        self.assets.clear();
        self.outdated.clear();

        let mut stack = vec![self.source_root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                entries.push(entry?.path());
            }
            entries.sort();

            for path in entries {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };

                // Hidden-file marker covers files and directories alike.
                if name.starts_with('.') {
                    continue;
                }

                if path.is_dir() {
                    stack.push(path);
                } else if path.is_file() {
                    self.scan_file(&path, cache)?;
                }
            }
        }

        info!(
            assets = self.assets.len(),
            outdated = self.outdated.len(),
            "scan finished"
        );

        Ok(())
    }

    /// Push one job per (outdated asset, attached importer), in scan order.
    pub fn queue_build(&self, queue: &mut BuildQueue) {
        for entry in &self.outdated {
            for importer in entry.asset.importers() {
                let label = format!("{} [{}]", entry.asset.rel_path().display(), importer.kind());
                let asset = entry.asset.clone();
                let importer = importer.clone();
                let output_root = self.output_root.clone();

                queue.push(BuildJob::new(asset.id(), label, move || {
                    importer.process(&output_root, &asset)
                }));
            }
        }
    }

    /// Commit the pending fingerprints of every outdated asset whose jobs
    /// all succeeded. Returns the number of committed assets.
    pub fn commit_built(
        &self,
        cache: &mut dyn CacheStore,
        report: &BuildReport,
    ) -> Result<usize> {
        let mut committed = 0;

        for entry in &self.outdated {
            let id = entry.asset.id();
            if !report.asset_succeeded(id) {
                debug!(asset = %id, "skipping fingerprint commit for failed build");
                continue;
            }
            cache.update(&id, &entry.fingerprints)?;
            committed += 1;
        }

        Ok(committed)
    }

    /// Process a single regular file from the walk.
    fn scan_file(&mut self, path: &Path, cache: &dyn CacheStore) -> Result<()> {
        if sidecar::is_sidecar(path) {
            return Ok(());
        }

        let rel_path = path
            .strip_prefix(&self.source_root)
            .unwrap_or(path)
            .to_path_buf();

        let asset = match self.resolve_asset(path, &rel_path)? {
            Some(asset) => asset,
            None => return Ok(()),
        };

        if asset.importers().is_empty() {
            debug!(asset = %asset.id(), path = ?rel_path, "no importers attached; skipping");
            return Ok(());
        }

        let id = asset.id();
        if self.assets.contains_key(&id) {
            return Err(PipelineError::DuplicateAsset(id));
        }

        let fingerprints = Fingerprints {
            meta: digest::fingerprint_file(&asset.sidecar_path())?,
            file: digest::fingerprint_file(path)?,
        };

        let changed = cache.lookup(&id)?.as_ref() != Some(&fingerprints);
        let output_exists = self.output_root.join(id.output_rel_path()).is_file();

        if changed || !output_exists {
            debug!(
                asset = %id,
                path = ?rel_path,
                changed,
                output_exists,
                "asset is outdated"
            );
            self.outdated.push(OutdatedAsset {
                asset: asset.clone(),
                fingerprints,
            });
        }

        self.assets.insert(id, asset);
        Ok(())
    }

    /// Reload the asset from its sidecar, or create it when the sidecar is
    /// missing (or broken) and a rule claims the file.
    fn resolve_asset(&self, path: &Path, rel_path: &Path) -> Result<Option<Asset>> {
        let meta_path = sidecar::sidecar_path(path);

        if meta_path.is_file() {
            match sidecar::read_sidecar(&meta_path, &self.importers) {
                Ok((id, importers)) => {
                    return Ok(Some(Asset::new(
                        id,
                        path.to_path_buf(),
                        rel_path.to_path_buf(),
                        importers,
                    )));
                }
                // The registry and the on-disk data disagree about importer
                // kinds; re-minting an identity would not repair that.
                Err(err @ PipelineError::UnknownImporter(_)) => return Err(err),
                Err(err) => {
                    // Treated as "asset not yet known" rather than surfaced
                    // as corruption; the sidecar is rewritten below.
                    warn!(
                        path = ?meta_path,
                        error = %err,
                        "unreadable sidecar document; re-creating asset"
                    );
                }
            }
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };

        let Some(kind) = self.rules.match_file(file_name) else {
            // Not every file is an asset; no rule match means no record.
            return Ok(None);
        };

        let importer = self.importers.create_default(kind)?;
        let id = AssetId::generate();
        let asset = Asset::new(
            id,
            path.to_path_buf(),
            rel_path.to_path_buf(),
            vec![importer],
        );

        sidecar::write_sidecar(&asset)?;
        info!(asset = %id, path = ?rel_path, importer = kind, "registered new asset");

        Ok(Some(asset))
    }
}
