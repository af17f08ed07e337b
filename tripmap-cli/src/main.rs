//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tripmap_cli::CliError;

fn main() {
    match tripmap_cli::run() {
        Ok(()) => {}
        // Clap renders help, version and usage errors itself.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("tripmap: {err}");
            std::process::exit(1);
        }
    }
}
