// src/importer/copy.rs

//! Pass-through importer: the artifact is a byte-for-byte copy of the
//! source file, placed at the content-addressed output location.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset::Asset;
use crate::errors::Result;
use crate::importer::{config_table, decode_table, write_artifact, Importer};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyImporter {}

impl Importer for CopyImporter {
    fn kind(&self) -> &'static str {
        "copy"
    }

    fn config_document(&self) -> Result<toml::Table> {
        config_table(self)
    }

    fn process(&self, output_root: &Path, asset: &Asset) -> anyhow::Result<()> {
        debug!(asset = %asset.id(), path = ?asset.rel_path(), "copying asset");
        write_artifact(output_root, asset)?;
        Ok(())
    }
}

pub(crate) fn new_default() -> Arc<dyn Importer> {
    Arc::new(CopyImporter::default())
}

pub(crate) fn decode(table: &toml::Table) -> Result<Arc<dyn Importer>> {
    Ok(Arc::new(decode_table::<CopyImporter>(table)?))
}
