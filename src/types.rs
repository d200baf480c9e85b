use std::str::FromStr;

use serde::Deserialize;

/// Backend used for the fingerprint cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStorage {
    /// Persist fingerprints to the cache file (default; incremental across
    /// runs).
    File,
    /// Keep fingerprints in memory only; every run rebuilds everything.
    Memory,
}

impl Default for CacheStorage {
    fn default() -> Self {
        CacheStorage::File
    }
}

impl FromStr for CacheStorage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(CacheStorage::File),
            "memory" => Ok(CacheStorage::Memory),
            other => Err(format!(
                "invalid cache_storage: {other} (expected \"file\" or \"memory\")"
            )),
        }
    }
}
