// src/asset/mod.rs

//! Asset identity and the asset entity.
//!
//! An asset is a source file plus a stable 128-bit random identity and the
//! importers attached to it. The identity, not the file path, names the
//! asset everywhere else in the pipeline: the fingerprint cache is keyed by
//! it and the output artifact location is a pure function of it
//! (`shard/id`, where the shard is the first two hex characters).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::PipelineError;
use crate::importer::Importer;

pub mod sidecar;

/// Number of hex characters in a rendered asset id.
const ID_HEX_LEN: usize = 32;

/// Stable identity of an asset, independent of its file path.
///
/// 128 random bits, rendered as a fixed-length lower-case hex string.
/// Immutable once assigned; minted exactly once per asset and persisted in
/// the sidecar document.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(u128);

impl AssetId {
    /// Mint a fresh random identity.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Output bucket for this asset: the first two hex characters of the id.
    pub fn shard(&self) -> String {
        format!("{:02x}", (self.0 >> 120) as u8)
    }

    /// Artifact location relative to the output root: `shard/id`.
    pub fn output_rel_path(&self) -> PathBuf {
        Path::new(&self.shard()).join(self.to_string())
    }
}

impl From<u128> for AssetId {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({:032x})", self.0)
    }
}

impl FromStr for AssetId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PipelineError::InvalidAssetId(s.to_string()));
        }
        let raw = u128::from_str_radix(s, 16)
            .map_err(|_| PipelineError::InvalidAssetId(s.to_string()))?;
        Ok(Self(raw))
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| D::Error::custom(format!("invalid asset id '{s}'")))
    }
}

/// A registered source file: identity, paths, and attached importers.
///
/// Importers are shared trait objects so an asset can be cloned cheaply into
/// build jobs without copying configuration.
#[derive(Debug, Clone)]
pub struct Asset {
    id: AssetId,
    source_path: PathBuf,
    rel_path: PathBuf,
    importers: Vec<Arc<dyn Importer>>,
}

impl Asset {
    pub fn new(
        id: AssetId,
        source_path: PathBuf,
        rel_path: PathBuf,
        importers: Vec<Arc<dyn Importer>>,
    ) -> Self {
        Self {
            id,
            source_path,
            rel_path,
            importers,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Absolute path of the source file.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Path of the source file relative to the source root.
    pub fn rel_path(&self) -> &Path {
        &self.rel_path
    }

    pub fn importers(&self) -> &[Arc<dyn Importer>] {
        &self.importers
    }

    /// Location of this asset's sidecar document.
    pub fn sidecar_path(&self) -> PathBuf {
        sidecar::sidecar_path(&self.source_path)
    }

    /// Artifact location relative to the output root.
    pub fn output_rel_path(&self) -> PathBuf {
        self.id.output_rel_path()
    }
}
