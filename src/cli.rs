// src/cli.rs

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Incremental content-build pipeline: scans a source tree, detects stale
/// assets against a fingerprint cache, and rebuilds them on a worker pool.
#[derive(Parser, Debug)]
#[command(name = "assetpipe", version)]
pub struct CliArgs {
    /// Input resource path.
    #[arg(long)]
    pub source: PathBuf,

    /// Output path for built artifacts.
    #[arg(long)]
    pub output: PathBuf,

    /// Fingerprint cache file (default: <source>/.assetpipe/cache).
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Pipeline config file (default: Assetpipe.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent build workers (overrides the config).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Print the effective rule table and settings without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Log level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
