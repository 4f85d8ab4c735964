//! CLI entry point for building photo cascades

use clap::Parser;
use photo_cascade::io::cli::{Cli, FileProcessor};
use tracing_subscriber::EnvFilter;

fn main() -> photo_cascade::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let processor = FileProcessor::new(cli);
    processor.process()
}
