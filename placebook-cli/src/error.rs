//! Error types emitted by the placebook CLI.

use std::sync::Arc;

use placebook_data::ProviderBuildError;
use placebook_session::{QueryParseError, SessionError};
use thiserror::Error;

/// Errors emitted by the placebook CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// Both a literal key and a key file were configured.
    #[error("--{key} and --{key_file} are mutually exclusive")]
    ConflictingKeySources {
        key: &'static str,
        key_file: &'static str,
    },
    /// A `--search` or `--lookup` value did not parse.
    #[error("invalid --{flag} value: {source}")]
    InvalidQuery {
        flag: &'static str,
        #[source]
        source: QueryParseError,
    },
    /// Constructing the Nominatim resolver failed.
    #[error("failed to build resolver for {base_url:?}: {source}")]
    BuildResolver {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The session aborted.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Serialising the combined store failed.
    #[error("failed to serialise the address book: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
