// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::asset::AssetId;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("unknown importer kind '{0}'")]
    UnknownImporter(String),

    #[error("duplicate asset id '{0}'")]
    DuplicateAsset(AssetId),

    #[error("invalid asset id '{0}'")]
    InvalidAssetId(String),

    #[error("{failed} of {total} build jobs failed")]
    BuildFailed { failed: usize, total: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
