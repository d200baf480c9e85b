// src/importer/mod.rs

//! Importer capability interface and the typed decode registry.
//!
//! An importer is a named transformation from a raw source file to a build
//! artifact. The pipeline treats importers as pluggable collaborators: it
//! resolves them by filename pattern, persists their configuration in the
//! sidecar document, and calls `process` from build workers. The transform
//! internals are intentionally thin here: the built-in set packs source
//! bytes into the content-addressed output layout and carries the
//! configuration surface that belongs in sidecars.
//!
//! Deserialization goes through [`ImporterRegistry`], an explicit mapping
//! from the kind discriminator to a typed decoder. There is no runtime
//! introspection: every kind registers a concrete `fn(&Table) -> importer`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crate::asset::Asset;
use crate::errors::{PipelineError, Result};

pub mod copy;
pub mod mesh;
pub mod texture;

pub use copy::CopyImporter;
pub use mesh::MeshImporter;
pub use texture::{PanoramaImporter, TextureCompression, TextureImporter, TextureQuality};

/// A named transformation attached to an asset.
///
/// Implementations are `Send + Sync` because `process` runs on build worker
/// threads while the same instance stays registered on the asset.
pub trait Importer: fmt::Debug + Send + Sync {
    /// Discriminator string used in sidecar documents and rule tables.
    fn kind(&self) -> &'static str;

    /// Serialize this importer's configuration into a sidecar table.
    fn config_document(&self) -> Result<toml::Table>;

    /// Build the artifact for `asset` under `output_root/shard/id`.
    ///
    /// May fail; the error is captured per-job by the build queue, never
    /// swallowed.
    fn process(&self, output_root: &Path, asset: &Asset) -> anyhow::Result<()>;
}

type DecodeFn = fn(&toml::Table) -> Result<Arc<dyn Importer>>;
type DefaultFn = fn() -> Arc<dyn Importer>;

struct ImporterEntry {
    new_default: DefaultFn,
    decode: DecodeFn,
}

/// Explicit registry of importer kinds.
///
/// Maps each kind discriminator to a factory for a default-configured
/// instance (used when a rule first matches a file) and a typed decoder
/// (used when replaying a sidecar document).
pub struct ImporterRegistry {
    entries: BTreeMap<&'static str, ImporterEntry>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry containing every built-in importer kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("copy", copy::new_default, copy::decode);
        registry.register("texture", texture::new_default_texture, texture::decode_texture);
        registry.register(
            "panorama",
            texture::new_default_panorama,
            texture::decode_panorama,
        );
        registry.register("mesh", mesh::new_default, mesh::decode);
        registry
    }

    pub fn register(&mut self, kind: &'static str, new_default: DefaultFn, decode: DecodeFn) {
        self.entries.insert(kind, ImporterEntry { new_default, decode });
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Known kind discriminators, in stable order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Create a default-configured instance of `kind`.
    pub fn create_default(&self, kind: &str) -> Result<Arc<dyn Importer>> {
        let entry = self
            .entries
            .get(kind)
            .ok_or_else(|| PipelineError::UnknownImporter(kind.to_string()))?;
        Ok((entry.new_default)())
    }

    /// Decode an importer of `kind` from a sidecar table.
    ///
    /// Unknown discriminators are fatal; unknown fields inside the table are
    /// rejected by the typed decoders themselves.
    pub fn decode(&self, kind: &str, table: &toml::Table) -> Result<Arc<dyn Importer>> {
        let entry = self
            .entries
            .get(kind)
            .ok_or_else(|| PipelineError::UnknownImporter(kind.to_string()))?;
        (entry.decode)(table)
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ImporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImporterRegistry")
            .field("kinds", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Serialize an importer configuration into a TOML table.
pub(crate) fn config_table<T: Serialize>(config: &T) -> Result<toml::Table> {
    match toml::Value::try_from(config)? {
        toml::Value::Table(table) => Ok(table),
        other => Err(PipelineError::ConfigError(format!(
            "importer config serialized to a non-table value: {other:?}"
        ))),
    }
}

/// Decode a typed importer configuration from a sidecar table.
pub(crate) fn decode_table<T: serde::de::DeserializeOwned>(table: &toml::Table) -> Result<T> {
    Ok(toml::Value::Table(table.clone()).try_into()?)
}

/// Write the artifact for `asset` by copying its source bytes to
/// `output_root/shard/id`, creating the shard directory on demand.
///
/// Output paths are disjoint per identity, so concurrent workers never
/// write the same file.
pub(crate) fn write_artifact(output_root: &Path, asset: &Asset) -> anyhow::Result<PathBuf> {
    let dest = output_root.join(asset.output_rel_path());
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }
    fs::copy(asset.source_path(), &dest).with_context(|| {
        format!(
            "writing artifact for {:?} to {:?}",
            asset.rel_path(),
            dest
        )
    })?;
    Ok(dest)
}
