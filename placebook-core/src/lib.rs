//! Core domain types for the placebook address book.
//!
//! A [`Record`] is one place resolved by a geocoding service; a
//! [`RecordStore`] keys records by name or uid and merges with
//! last-write-wins semantics. Constructors return `Result` so malformed
//! service payloads surface early.

#![forbid(unsafe_code)]

pub mod record;
pub mod resolve;
pub mod store;
pub mod throttle;
pub mod uid;

#[doc(hidden)]
pub mod test_support;

pub use record::{BoundingBox, OsmType, Record, RecordError, RecordResponse, Scalar};
pub use resolve::{Endpoint, ResolveError, Resolver};
pub use store::{Deflated, RecordStore, StoreError};
pub use throttle::Throttle;
pub use uid::{Uid, UidError};
