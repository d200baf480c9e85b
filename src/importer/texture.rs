// src/importer/texture.rs

//! Texture and panorama importers.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset::Asset;
use crate::errors::Result;
use crate::importer::{config_table, decode_table, write_artifact, Importer};

/// Texture quality tier, mirroring the `--quality` surface of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureQuality {
    #[default]
    Hd,
    Sd,
}

/// Hardware image compression setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureCompression {
    #[default]
    Disabled,
    Quant,
}

/// Importer for plain 2D textures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureImporter {
    #[serde(default)]
    pub quality: TextureQuality,
    #[serde(default)]
    pub compression: TextureCompression,
}

impl Importer for TextureImporter {
    fn kind(&self) -> &'static str {
        "texture"
    }

    fn config_document(&self) -> Result<toml::Table> {
        config_table(self)
    }

    fn process(&self, output_root: &Path, asset: &Asset) -> anyhow::Result<()> {
        debug!(
            asset = %asset.id(),
            path = ?asset.rel_path(),
            quality = ?self.quality,
            compression = ?self.compression,
            "building texture"
        );
        write_artifact(output_root, asset)?;
        Ok(())
    }
}

/// Importer for panoramic (environment) textures.
///
/// Resolved ahead of the plain texture importer by the default rule table
/// (`*.panorama.<ext>` before `*.<ext>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanoramaImporter {
    #[serde(default)]
    pub quality: TextureQuality,
}

impl Importer for PanoramaImporter {
    fn kind(&self) -> &'static str {
        "panorama"
    }

    fn config_document(&self) -> Result<toml::Table> {
        config_table(self)
    }

    fn process(&self, output_root: &Path, asset: &Asset) -> anyhow::Result<()> {
        debug!(
            asset = %asset.id(),
            path = ?asset.rel_path(),
            quality = ?self.quality,
            "building panorama"
        );
        write_artifact(output_root, asset)?;
        Ok(())
    }
}

pub(crate) fn new_default_texture() -> Arc<dyn Importer> {
    Arc::new(TextureImporter::default())
}

pub(crate) fn decode_texture(table: &toml::Table) -> Result<Arc<dyn Importer>> {
    Ok(Arc::new(decode_table::<TextureImporter>(table)?))
}

pub(crate) fn new_default_panorama() -> Arc<dyn Importer> {
    Arc::new(PanoramaImporter::default())
}

pub(crate) fn decode_panorama(table: &toml::Table) -> Result<Arc<dyn Importer>> {
    Ok(Arc::new(decode_table::<PanoramaImporter>(table)?))
}
