//! Command-line interface for the placebook address book.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod resolve;

pub use error::CliError;

use resolve::{ResolveArgs, run_resolve};

const ARG_INPUT: &str = "input";
const ARG_OUTPUT: &str = "output";
const ARG_SEARCH: &str = "search";
const ARG_LOOKUP: &str = "lookup";
const ARG_KEY: &str = "key";
const ARG_KEY_FILE: &str = "key-file";
const ARG_KEY_DIR: &str = "key-dir";
const ARG_BASE_URL: &str = "base-url";
const ARG_USER_AGENT: &str = "user-agent";

/// Run the placebook CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid or the
/// session fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Resolve(args) => run_resolve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "placebook",
    about = "Encrypted address book backed by OpenStreetMap Nominatim",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve places and update an encrypted address book.
    Resolve(ResolveArgs),
}

#[cfg(test)]
mod tests;
