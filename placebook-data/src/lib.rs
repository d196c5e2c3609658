//! Service-backed resolvers for placebook.
#![forbid(unsafe_code)]

pub mod nominatim;

pub use nominatim::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, NominatimConfig, NominatimResolver, ProviderBuildError,
};
