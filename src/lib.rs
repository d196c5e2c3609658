//! Facade crate for the placebook address book.
//!
//! This crate re-exports the record model, the encrypted vault and the
//! session orchestrator. The Nominatim HTTP resolver sits behind the
//! `nominatim` feature.

#![forbid(unsafe_code)]

pub use placebook_core::{
    BoundingBox, Deflated, Endpoint, OsmType, Record, RecordError, RecordResponse, RecordStore,
    ResolveError, Resolver, Scalar, StoreError, Throttle, Uid, UidError,
};
pub use placebook_session::{
    KeyedQuery, QueryParseError, SessionConfig, SessionError, SessionReport, SessionState,
    parse_keyed_queries, run_session,
};
pub use placebook_vault::{
    Cipher, DecryptionFailure, KEY_LEN, Key, KeyError, KeyManager, KeyOrigin, KeySource,
    ResolvedKey, VaultError,
};

#[cfg(feature = "nominatim")]
pub use placebook_data::{DEFAULT_BASE_URL, NominatimConfig, NominatimResolver, ProviderBuildError};
