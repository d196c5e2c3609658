//! Nominatim geocoding over HTTP.
//!
//! [`NominatimResolver`] implements [`placebook_core::Resolver`] against the
//! `search` and `lookup` endpoints of a Nominatim instance, waiting for the
//! configured rate limit before every request.
//!
//! # Example
//!
//! ```no_run
//! use placebook_core::Resolver;
//! use placebook_data::nominatim::{NominatimConfig, NominatimResolver};
//! use std::time::Duration;
//!
//! let config = NominatimConfig::default()
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-address-book/1.0 (me@example.org)");
//! let resolver = NominatimResolver::with_config(config)?;
//!
//! let restaurant = resolver.lookup("W228034523")?;
//! assert_eq!(restaurant.uid().as_str(), "w228034523&amenity=restaurant");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;
mod response;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, NominatimConfig, NominatimResolver, ProviderBuildError,
};
