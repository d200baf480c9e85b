// src/lib.rs

pub mod asset;
pub mod cache;
pub mod cli;
pub mod config;
pub mod digest;
pub mod errors;
pub mod exec;
pub mod importer;
pub mod logging;
pub mod registry;
pub mod rules;
pub mod types;

use std::time::Instant;

use tracing::{error, info};

use crate::cache::{CacheStore, FileCacheStore, MemoryCacheStore, DEFAULT_CACHE_PATH};
use crate::cli::CliArgs;
use crate::config::loader::load_or_default;
use crate::config::ConfigFile;
use crate::errors::{PipelineError, Result};
use crate::exec::BuildQueue;
use crate::importer::ImporterRegistry;
use crate::registry::AssetRegistry;
use crate::rules::BuildRules;
use crate::types::CacheStorage;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (rule table, worker count, cache storage)
/// - the importer registry and compiled build rules
/// - the cache store
/// - the scan -> build -> commit sequence
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;

    let importers = ImporterRegistry::builtin();
    let rules = BuildRules::compile(&cfg.effective_rules(), &importers)?;

    if args.dry_run {
        print_dry_run(&cfg, &rules);
        return Ok(());
    }

    if !args.source.is_dir() {
        return Err(PipelineError::ConfigError(format!(
            "the input folder does not exist: {:?}",
            args.source
        )));
    }

    let workers = match args.workers {
        Some(0) => {
            return Err(PipelineError::ConfigError(
                "--workers must be >= 1 (got 0)".to_string(),
            ));
        }
        Some(n) => n,
        None => cfg.config.workers,
    };

    let cache_path = args
        .cache
        .clone()
        .unwrap_or_else(|| args.source.join(DEFAULT_CACHE_PATH));

    let mut cache: Box<dyn CacheStore> = match cfg.config.cache_storage {
        CacheStorage::File => Box::new(FileCacheStore::new(cache_path)),
        CacheStorage::Memory => Box::new(MemoryCacheStore::new()),
    };

    let start = Instant::now();

    let mut registry = AssetRegistry::new(
        args.source.clone(),
        args.output.clone(),
        rules,
        importers,
    );
    registry.scan(cache.as_ref())?;

    info!(
        assets = registry.asset_count(),
        outdated = registry.outdated().len(),
        "{} assets to build",
        registry.outdated().len()
    );

    let mut queue = BuildQueue::new();
    registry.queue_build(&mut queue);
    let total = queue.len();

    let report = queue.execute(workers)?;

    let committed = registry.commit_built(cache.as_mut(), &report)?;

    for failure in report.failures() {
        error!(
            asset = %failure.asset,
            job = %failure.label,
            error = %failure.error,
            "build job failed"
        );
    }

    info!(
        built = report.completed(),
        committed,
        elapsed_secs = start.elapsed().as_secs(),
        "pipeline finished"
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(PipelineError::BuildFailed {
            failed: report.failures().len(),
            total,
        })
    }
}

/// Simple dry-run output: print settings and the effective rule table.
fn print_dry_run(cfg: &ConfigFile, rules: &BuildRules) {
    println!("assetpipe dry-run");
    println!("  config.workers = {}", cfg.config.workers);
    println!("  config.cache_storage = {:?}", cfg.config.cache_storage);
    println!();

    println!("rules ({}):", rules.len());
    for (pattern, kind) in rules.iter() {
        println!("  {pattern} -> {kind}");
    }
}
