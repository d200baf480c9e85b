// src/config/validate.rs

use globset::Glob;

use crate::config::{ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};
use crate::importer::ImporterRegistry;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.rules))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_rules(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    // cache_storage is strongly typed and validated during deserialization,
    // so only the worker count needs a semantic check here.
    if cfg.config.workers == 0 {
        return Err(PipelineError::ConfigError(
            "[config].workers must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_rules(cfg: &RawConfigFile) -> Result<()> {
    let registry = ImporterRegistry::builtin();

    for (index, rule) in cfg.rules.iter().enumerate() {
        if rule.pattern.is_empty() {
            return Err(PipelineError::ConfigError(format!(
                "rule #{} has an empty pattern",
                index + 1
            )));
        }

        if let Err(err) = Glob::new(&rule.pattern) {
            return Err(PipelineError::ConfigError(format!(
                "rule #{} has an invalid glob pattern '{}': {}",
                index + 1,
                rule.pattern,
                err
            )));
        }

        if !registry.contains(&rule.importer) {
            let known: Vec<_> = registry.kinds().collect();
            return Err(PipelineError::ConfigError(format!(
                "rule #{} names unknown importer '{}' (known kinds: {})",
                index + 1,
                rule.importer,
                known.join(", ")
            )));
        }
    }

    Ok(())
}
