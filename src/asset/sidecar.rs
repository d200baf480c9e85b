// src/asset/sidecar.rs

//! Sidecar documents.
//!
//! Every asset persists its identity and importer configuration in a TOML
//! companion file next to the source file (`texture.png` ->
//! `texture.png.meta`):
//!
//! ```toml
//! id = "3f2a9c01d2e44b7a8c1fb02a6de91c55"
//!
//! [importers.texture]
//! quality = "hd"
//! compression = "disabled"
//! ```
//!
//! Each `[importers.<kind>]` table is decoded through the explicit importer
//! registry; the kind string is the discriminator. An unknown kind is a hard
//! error: it means the registry and the on-disk data disagree, which is not
//! something a rescan can repair.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset::{Asset, AssetId};
use crate::errors::Result;
use crate::importer::{Importer, ImporterRegistry};

/// Extension appended to the source file name (not replacing its own).
pub const SIDECAR_EXT: &str = "meta";

/// Sidecar location for a source file: the full file name plus `.meta`.
pub fn sidecar_path(source_path: &Path) -> PathBuf {
    let mut name = source_path.as_os_str().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXT);
    PathBuf::from(name)
}

/// Whether `path` names a sidecar document.
pub fn is_sidecar(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SIDECAR_EXT)
}

/// On-disk shape of a sidecar document.
#[derive(Debug, Serialize, Deserialize)]
struct SidecarDoc {
    id: AssetId,
    #[serde(default)]
    importers: BTreeMap<String, toml::Table>,
}

/// Persist the identity and importer configuration of `asset`.
pub fn write_sidecar(asset: &Asset) -> Result<()> {
    let mut importers = BTreeMap::new();
    for importer in asset.importers() {
        importers.insert(importer.kind().to_string(), importer.config_document()?);
    }

    let doc = SidecarDoc {
        id: asset.id(),
        importers,
    };

    let path = asset.sidecar_path();
    fs::write(&path, toml::to_string_pretty(&doc)?)?;
    debug!(asset = %asset.id(), path = ?path, "wrote sidecar document");
    Ok(())
}

/// Reload an asset's identity and importers from its sidecar document.
///
/// IO and TOML errors are returned as-is; the caller decides whether a
/// broken document means "treat as unknown asset" (the registry's policy)
/// or a hard failure. An unknown importer kind is always a hard failure.
pub fn read_sidecar(
    path: &Path,
    registry: &ImporterRegistry,
) -> Result<(AssetId, Vec<Arc<dyn Importer>>)> {
    let contents = fs::read_to_string(path)?;
    let doc: SidecarDoc = toml::from_str(&contents)?;

    let mut importers = Vec::with_capacity(doc.importers.len());
    for (kind, table) in &doc.importers {
        importers.push(registry.decode(kind, table)?);
    }

    Ok((doc.id, importers))
}
