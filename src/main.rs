//! Trolley command line

use std::{io, process};

mod cli;

use crate::cli::{CliConfig, logging};

/// Trolley entry point
#[tokio::main]
pub async fn main() {
    // --help and --version also arrive here as errors
    let config = CliConfig::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = logging::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        process::exit(1);
    }

    let mut stdout = io::stdout().lock();

    if let Err(error) = cli::run(config, &mut stdout).await {
        #[expect(clippy::print_stderr, reason = "command errors are reported to the user")]
        {
            eprintln!("Error: {error}");
        }

        process::exit(1);
    }
}
