// src/config/mod.rs

//! Pipeline configuration.
//!
//! The config file is optional; without one the pipeline runs with the
//! built-in rule table and default worker count. When present, it follows
//! the raw-deserialize-then-validate split: [`RawConfigFile`] is exactly
//! what serde read, [`ConfigFile`] is the validated form the rest of the
//! application consumes.
//!
//! ```toml
//! [config]
//! workers = 4
//! cache_storage = "file"
//!
//! [[rule]]
//! pattern = "*.panorama.png"
//! importer = "panorama"
//!
//! [[rule]]
//! pattern = "*.png"
//! importer = "texture"
//! ```
//!
//! Rules are ordered; the first pattern matching a file name wins, so more
//! specific patterns belong first.

use serde::Deserialize;

use crate::rules;
use crate::types::CacheStorage;

pub mod loader;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};

/// Worker count used when neither the config nor the CLI supplies one.
pub const DEFAULT_WORKERS: usize = 8;

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

/// Raw deserialized config file, prior to semantic validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

/// Global `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub cache_storage: CacheStorage,
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            cache_storage: CacheStorage::default(),
        }
    }
}

/// One ordered `[[rule]]` entry: files matching `pattern` are imported by
/// the importer kind named in `importer`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,
    pub importer: String,
}

/// Validated configuration. Construct via `TryFrom<RawConfigFile>` (see
/// [`validate`]) or [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub rules: Vec<RuleConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, rules: Vec<RuleConfig>) -> Self {
        Self { config, rules }
    }

    /// The rule table to build with: the configured rules, or the built-in
    /// default table when the config declares none.
    pub fn effective_rules(&self) -> Vec<RuleConfig> {
        if self.rules.is_empty() {
            rules::default_rules()
        } else {
            self.rules.clone()
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default(), Vec::new())
    }
}
