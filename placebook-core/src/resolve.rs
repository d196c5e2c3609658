//! Turn free-text queries and OSM ids into [`Record`] values.
//!
//! The [`Resolver`] trait is the seam between the record model and the
//! geocoding service. Implementations are synchronous so the session can run
//! without an async runtime.

use std::fmt;

use thiserror::Error;

use crate::Record;
use crate::record::RecordError;

/// Endpoint a query was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Free-text search.
    Search,
    /// Lookup by OSM id.
    Lookup,
}

impl Endpoint {
    /// Path segment used by the service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Lookup => "lookup",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from [`Resolver::search`] and [`Resolver::lookup`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The service answered but found nothing.
    #[error("{endpoint} for {query:?} returned no match")]
    NoMatch {
        /// Endpoint queried.
        endpoint: Endpoint,
        /// Query as supplied by the caller.
        query: String,
    },
    /// The request did not complete or the service reported a failure.
    #[error("service request to {url} failed: {message}")]
    ServiceUnavailable {
        /// Request URL.
        url: String,
        /// Transport or service message.
        message: String,
    },
    /// The response body was not the expected JSON.
    #[error("malformed service response: {message}")]
    MalformedResponse {
        /// Parser message.
        message: String,
    },
    /// The response held a place that failed validation.
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] RecordError),
}

/// Resolve places by free text or by OSM id.
///
/// Implementations return the first match only.
///
/// # Examples
///
/// ```rust
/// use placebook_core::{Record, ResolveError, Resolver};
/// use placebook_core::resolve::Endpoint;
///
/// struct Nothing;
///
/// impl Resolver for Nothing {
///     fn search(&self, query: &str) -> Result<Record, ResolveError> {
///         Err(ResolveError::NoMatch { endpoint: Endpoint::Search, query: query.to_owned() })
///     }
///
///     fn lookup(&self, osm_ids: &str) -> Result<Record, ResolveError> {
///         Err(ResolveError::NoMatch { endpoint: Endpoint::Lookup, query: osm_ids.to_owned() })
///     }
/// }
///
/// assert!(Nothing.search("Atlantis").is_err());
/// ```
pub trait Resolver {
    /// Return the first place matching `query`.
    fn search(&self, query: &str) -> Result<Record, ResolveError>;

    /// Return the place identified by `osm_ids`.
    ///
    /// Accepts lookup ids (`W228034523`) as well as uids
    /// (`w228034523&amenity=restaurant`).
    fn lookup(&self, osm_ids: &str) -> Result<Record, ResolveError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn search(&self, query: &str) -> Result<Record, ResolveError> {
        (**self).search(query)
    }

    fn lookup(&self, osm_ids: &str) -> Result<Record, ResolveError> {
        (**self).lookup(osm_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubResolver, restaurant};
    use rstest::rstest;

    #[rstest]
    fn reference_forwards_to_resolver() {
        let stub = StubResolver::default().with_lookup("W228034523", restaurant());
        let by_ref: &dyn Resolver = &stub;
        let record = (&by_ref).lookup("W228034523").expect("stubbed");
        assert_eq!(record.uid().as_str(), "w228034523&amenity=restaurant");
    }

    #[rstest]
    fn no_match_names_endpoint_and_query() {
        let err = ResolveError::NoMatch {
            endpoint: Endpoint::Search,
            query: "Atlantis".to_owned(),
        };
        assert_eq!(err.to_string(), "search for \"Atlantis\" returned no match");
    }
}
