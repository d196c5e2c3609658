//! Session orchestration for placebook.
//!
//! A session resolves a key, loads the encrypted input store, resolves the
//! requested searches and lookups, merges everything and optionally writes
//! the result back encrypted. See [`run_session`].
#![forbid(unsafe_code)]

mod config;
mod error;
mod query;
mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use query::{KeyedQuery, QueryParseError, parse_keyed_queries};
pub use session::{SessionReport, SessionState, run_session};
