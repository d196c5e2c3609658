//! HTTP [`Resolver`] backed by the Nominatim `search` and `lookup` endpoints.
//!
//! The [`Resolver`] trait is synchronous so the session can stay a plain
//! sequential loop. This resolver bridges the async HTTP calls by blocking on
//! a Tokio runtime it owns.
//!
//! # Example
//!
//! ```no_run
//! use placebook_core::Resolver;
//! use placebook_data::NominatimResolver;
//!
//! let resolver = NominatimResolver::new("https://nominatim.openstreetmap.org")?;
//! let record = resolver.search("Vatican City")?;
//! println!("{}", record.uid());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use log::{debug, info};
use placebook_core::{Endpoint, Record, ResolveError, Resolver, Throttle};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::response::{failure_message, first_record};

/// Public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default user agent; the public instance rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("placebook/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parameters sent with every request. Extras carried by a query override
/// these by name.
const DEFAULT_PARAMS: [(&str, &str); 3] =
    [("format", "jsonv2"), ("addressdetails", "1"), ("limit", "1")];

/// Error type for [`NominatimResolver`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The configured base URL does not parse.
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        /// Rejected URL.
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`NominatimResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Minimum delay before each request.
    pub rate_limit: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            rate_limit: Throttle::DEFAULT_DELAY,
        }
    }
}

impl NominatimConfig {
    /// Create a configuration for the instance at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the delay applied before each request. `Duration::ZERO` disables
    /// throttling, which is only appropriate for private instances.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// Nominatim-backed [`Resolver`].
///
/// When called from inside a multi-threaded Tokio runtime the request runs on
/// that runtime via [`tokio::task::block_in_place`]; otherwise the resolver's
/// own current-thread runtime drives it.
pub struct NominatimResolver {
    client: Client,
    base_url: Url,
    config: NominatimConfig,
    throttle: Throttle,
    runtime: Runtime,
}

impl std::fmt::Debug for NominatimResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimResolver")
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl NominatimResolver {
    /// Create a resolver for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimConfig::new(base_url))
    }

    /// Create a resolver with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: NominatimConfig) -> Result<Self, ProviderBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            base_url,
            throttle: Throttle::new(config.rate_limit),
            config,
            runtime,
        })
    }

    /// The configuration this resolver was built from.
    #[must_use]
    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }

    /// Build the request URL for `query` on `endpoint`.
    ///
    /// The query may carry extra `&name=value` parameters; they are split off
    /// and sent alongside the defaults, so a uid such as
    /// `w228034523&amenity=restaurant` is a valid lookup argument.
    fn request_url(&self, endpoint: Endpoint, query: &str) -> Url {
        let primary = match endpoint {
            Endpoint::Search => "q",
            Endpoint::Lookup => "osm_ids",
        };
        let mut params: Vec<(String, String)> = DEFAULT_PARAMS
            .iter()
            .map(|&(name, value)| (name.to_owned(), value.to_owned()))
            .collect();
        let combined = format!("{primary}={query}");
        for (name, value) in url::form_urlencoded::parse(combined.as_bytes()) {
            let value = if name == "osm_ids" {
                uppercase_initials(&value)
            } else {
                value.into_owned()
            };
            match params.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => params.push((name.into_owned(), value)),
            }
        }

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint.as_str());
        }
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    async fn fetch_async(&self, endpoint: Endpoint, query: &str) -> Result<Record, ResolveError> {
        let url = self.request_url(endpoint, query);
        debug!("{} {url}", endpoint.as_str().to_uppercase());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        if !status.is_success() {
            return Err(ResolveError::ServiceUnavailable {
                url: url.into(),
                message: failure_message(status.as_u16(), &body),
            });
        }
        first_record(endpoint, query, url.as_str(), &body)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ResolveError {
        let message = if error.is_timeout() {
            format!("timed out after {}s", self.config.timeout.as_secs())
        } else {
            error.to_string()
        };
        ResolveError::ServiceUnavailable {
            url: url.to_owned(),
            message,
        }
    }

    fn fetch(&self, endpoint: Endpoint, query: &str) -> Result<Record, ResolveError> {
        self.throttle.wait();
        let future = self.fetch_async(endpoint, query);
        let record = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }?;
        info!("{endpoint}({query:?}) = {}", record.uid());
        Ok(record)
    }
}

impl Resolver for NominatimResolver {
    fn search(&self, query: &str) -> Result<Record, ResolveError> {
        self.fetch(Endpoint::Search, query)
    }

    fn lookup(&self, osm_ids: &str) -> Result<Record, ResolveError> {
        self.fetch(Endpoint::Lookup, osm_ids)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ProviderBuildError> {
    let url = Url::parse(raw).map_err(|source| ProviderBuildError::BaseUrl {
        url: raw.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderBuildError::BaseUrl {
            url: raw.to_owned(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}

/// `w1,n2` → `W1,N2`; lookup ids take an uppercase type initial.
fn uppercase_initials(osm_ids: &str) -> String {
    osm_ids
        .split(',')
        .map(|id| {
            let mut chars = id.trim().chars();
            chars.next().map_or_else(String::new, |initial| {
                initial.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(",")
}
