//! Resolve command implementation for the placebook CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use placebook_core::{Deflated, Resolver};
use placebook_data::{NominatimConfig, NominatimResolver};
use placebook_session::{SessionConfig, SessionReport, parse_keyed_queries, run_session};
use placebook_vault::{KeyOrigin, KeySource};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BASE_URL, ARG_INPUT, ARG_KEY, ARG_KEY_DIR, ARG_KEY_FILE, ARG_LOOKUP, ARG_OUTPUT,
    ARG_SEARCH, ARG_USER_AGENT, CliError,
};

/// CLI arguments for the `resolve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load an encrypted address book, resolve search queries and \
                 OSM lookups through Nominatim, merge the results and \
                 optionally write the book back. Queries take the form \
                 KEY=QUERY, or a bare QUERY stored under the place's uid.",
    about = "Resolve places into an encrypted address book"
)]
#[ortho_config(prefix = "PLACEBOOK")]
pub(crate) struct ResolveArgs {
    /// Encrypted address book to load first. A missing file is treated as empty.
    #[arg(short = 'i', long = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Where to write the combined address book.
    #[arg(short = 'o', long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Free-text search, optionally prefixed with `KEY=`. Repeatable.
    ///
    /// Keys may not contain `&`; `QUERY&name=value` passes an extra
    /// Nominatim parameter instead.
    #[arg(short = 's', long = ARG_SEARCH, value_name = "[KEY=]QUERY")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) search: Vec<String>,
    /// OSM id lookup such as `W228034523`, optionally prefixed with `KEY=`. Repeatable.
    #[arg(short = 'l', long = ARG_LOOKUP, value_name = "[KEY=]OSM_ID")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) lookup: Vec<String>,
    /// Key text (URL-safe base64, 32 bytes).
    #[arg(short = 'k', long = ARG_KEY, value_name = "key", conflicts_with = "key_file")]
    #[serde(default)]
    pub(crate) key: Option<String>,
    /// File holding the key text.
    #[arg(short = 'f', long = ARG_KEY_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) key_file: Option<Utf8PathBuf>,
    /// Directory receiving a generated key when no key is given.
    #[arg(long = ARG_KEY_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) key_dir: Option<Utf8PathBuf>,
    /// Base URL of the Nominatim instance.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// User agent sent to Nominatim.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

impl ResolveArgs {
    pub(crate) fn into_config(self) -> Result<ResolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ResolveConfig::try_from(merged)
    }
}

/// Resolved `resolve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolveConfig {
    pub(crate) session: SessionConfig,
    pub(crate) nominatim: NominatimConfig,
}

impl TryFrom<ResolveArgs> for ResolveConfig {
    type Error = CliError;

    fn try_from(args: ResolveArgs) -> Result<Self, Self::Error> {
        let key = match (args.key, args.key_file) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingKeySources {
                    key: ARG_KEY,
                    key_file: ARG_KEY_FILE,
                });
            }
            (Some(text), None) => KeySource::Literal(text),
            (None, Some(path)) => KeySource::File(path),
            (None, None) => KeySource::Generate {
                dir: args.key_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            },
        };

        let searches = parse_keyed_queries(&args.search).map_err(|source| {
            CliError::InvalidQuery {
                flag: ARG_SEARCH,
                source,
            }
        })?;
        let lookups = parse_keyed_queries(&args.lookup).map_err(|source| {
            CliError::InvalidQuery {
                flag: ARG_LOOKUP,
                source,
            }
        })?;

        let mut nominatim = NominatimConfig::default();
        if let Some(base_url) = args.base_url {
            nominatim.base_url = base_url;
        }
        if let Some(user_agent) = args.user_agent {
            nominatim = nominatim.with_user_agent(user_agent);
        }

        Ok(Self {
            session: SessionConfig {
                key,
                input: args.input,
                output: args.output,
                searches,
                lookups,
            },
            nominatim,
        })
    }
}

/// Builds the resolver for the current invocation.
pub(super) trait ResolverBuilder {
    fn build(&self, config: &NominatimConfig) -> Result<Box<dyn Resolver>, CliError>;
}

pub(super) struct NominatimResolverBuilder;

impl ResolverBuilder for NominatimResolverBuilder {
    fn build(&self, config: &NominatimConfig) -> Result<Box<dyn Resolver>, CliError> {
        let resolver = NominatimResolver::with_config(config.clone()).map_err(|source| {
            CliError::BuildResolver {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(resolver))
    }
}

pub(super) fn run_resolve(args: ResolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_resolve_with(args, &NominatimResolverBuilder, &mut stdout)?;
    Ok(())
}

pub(super) fn run_resolve_with(
    args: ResolveArgs,
    builder: &dyn ResolverBuilder,
    writer: &mut dyn Write,
) -> Result<SessionReport, CliError> {
    let config = args.into_config()?;
    let resolver = builder.build(&config.nominatim)?;
    let report = run_session(&config.session, resolver.as_ref())?;
    if let KeyOrigin::Generated(path) = &report.key_origin {
        warn!("no key supplied; pass --{ARG_KEY_FILE} {path} to reopen this address book");
    }
    if let Some(path) = &report.exported {
        info!("address book written to {path}");
    }
    write_deflated(writer, &report.store.deflate())?;
    Ok(report)
}

fn write_deflated(writer: &mut dyn Write, deflated: &Deflated) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(deflated).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ResolveConfig, CliError> {
    let merged = ResolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ResolveConfig::try_from(merged)
}
