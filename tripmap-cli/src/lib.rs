//! Command-line interface for trip map tooling.
//!
//! `search` runs one place lookup against a Nominatim-compatible geocoder and
//! prints the refined results. `replay` drives an editor session over a
//! headless map engine from a JSON script and emits the resulting trip draft.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod replay;
mod search;

pub use error::CliError;

use replay::{ReplayArgs, run_replay};
use search::{SearchArgs, run_search};

pub(crate) const ARG_SEARCH_QUERY: &str = "query";
pub(crate) const ARG_SEARCH_CITY: &str = "city";
pub(crate) const ARG_SEARCH_CITY_LOCAL: &str = "city-local";
pub(crate) const ARG_SEARCH_COUNTRY: &str = "country";
pub(crate) const ARG_SEARCH_GEOCODER_URL: &str = "geocoder-url";
pub(crate) const ARG_SEARCH_MAX_RESULTS: &str = "max-results";
pub(crate) const ENV_SEARCH_QUERY: &str = "TRIPMAP_CMDS_SEARCH_QUERY";

pub(crate) const ARG_REPLAY_SCRIPT: &str = "script";
pub(crate) const ARG_REPLAY_OUTPUT: &str = "output";
pub(crate) const ARG_REPLAY_ENGINE: &str = "engine";
pub(crate) const ARG_REPLAY_ACCESS_TOKEN: &str = "access-token";
pub(crate) const ENV_REPLAY_SCRIPT: &str = "TRIPMAP_CMDS_REPLAY_SCRIPT";

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Search(args) => run_search(args),
        Command::Replay(args) => run_replay(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tripmap",
    about = "Place search and editor replay for trip maps",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up places by name.
    Search(SearchArgs),
    /// Replay scripted editor events and emit the trip draft.
    Replay(ReplayArgs),
}

#[cfg(test)]
mod tests;
