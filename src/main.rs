// src/main.rs

use clap::Parser;

use assetpipe::cli::CliArgs;
use assetpipe::logging::init_logging;

fn main() {
    let args = CliArgs::parse();

    if let Err(err) = init_logging(args.log_level) {
        eprintln!("failed to initialise logging: {err}");
    }

    if let Err(err) = assetpipe::run(args) {
        tracing::error!(error = %err, "assetpipe failed");
        std::process::exit(1);
    }
}
