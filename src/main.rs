//! depot CLI entry point
//!
//! Installs the logger, delegates to the CLI module, prints errors to
//! stderr and exits non-zero on failure.

use depot::cli;

fn main() {
    env_logger::init();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
