//! Command-line interface wiring for the `barcode-sheet` binary.
//!
//! The sheet itself is fixed; the only flags control diagnostics.

use anyhow::Result;
use clap::{ArgAction, Parser};

pub mod generate;

/// Parsed CLI entrypoint for the `barcode-sheet` binary.
#[derive(Parser, Debug)]
#[command(
    name = "barcode-sheet",
    version,
    about = "Render Code128 barcodes 000-099 onto a single 10-column PNG sheet"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Install the `env_logger` backend; logs go to stderr, progress to stdout.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Execute the generator.
pub fn run(_cli: Cli) -> Result<()> {
    generate::handle()
}
