#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

use assetpipe::importer::ImporterRegistry;
use assetpipe::registry::AssetRegistry;
use assetpipe::rules::{default_rules, BuildRules};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("creating parent directories");
    }
    fs::write(path, contents).expect("writing test file");
}

/// Registry over `source`/`output` with the built-in importer set and the
/// default rule table.
pub fn default_registry(source: &Path, output: &Path) -> AssetRegistry {
    let importers = ImporterRegistry::builtin();
    let rules = BuildRules::compile(&default_rules(), &importers)
        .expect("default rule table must compile");
    AssetRegistry::new(source.to_path_buf(), output.to_path_buf(), rules, importers)
}
