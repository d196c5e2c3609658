//! Keyed collections of records and their serialised forms.
//!
//! A [`RecordStore`] maps a caller-chosen key to a [`Record`]. Keys default
//! to the record's uid. Two byte forms exist:
//!
//! - the deflated form ([`Deflated`]): key to uid only, re-inflated through
//!   [`Resolver::lookup`];
//! - the full form ([`RecordStore::to_full_bytes`]): every record field,
//!   decodable without the network.

use std::collections::BTreeMap;
use std::collections::btree_map;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::{ResolveError, Resolver};
use crate::uid::{Uid, UidError};
use crate::Record;

/// Errors raised while encoding or decoding store byte forms.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialising to JSON failed.
    #[error("failed to encode store: {0}")]
    Encode(#[source] serde_json::Error),
    /// The bytes were not the expected JSON shape.
    #[error("failed to decode store: {0}")]
    Decode(#[source] serde_json::Error),
    /// A deflated entry did not hold a valid uid.
    #[error("entry {key:?} holds an invalid uid: {source}")]
    InvalidUid {
        /// Entry key.
        key: String,
        /// Parse failure.
        #[source]
        source: UidError,
    },
}

/// Compact view of a store: key to uid.
///
/// # Examples
///
/// ```
/// use placebook_core::Deflated;
///
/// let bytes = br#"{"Pope":"r999&boundary=administrative"}"#;
/// let deflated = Deflated::from_bytes(bytes)?;
/// assert_eq!(deflated.get("Pope").map(|uid| uid.as_str()), Some("r999&boundary=administrative"));
/// assert_eq!(Deflated::from_bytes(&deflated.to_bytes()?)?, deflated);
/// # Ok::<(), placebook_core::StoreError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deflated(BTreeMap<String, Uid>);

impl Deflated {
    /// Decode the JSON object produced by [`Deflated::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] for anything other than a JSON object
    /// of strings and [`StoreError::InvalidUid`] when a value is not a uid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let raw: BTreeMap<String, String> =
            serde_json::from_slice(bytes).map_err(StoreError::Decode)?;
        raw.into_iter()
            .map(|(key, value)| match value.parse::<Uid>() {
                Ok(uid) => Ok((key, uid)),
                Err(source) => Err(StoreError::InvalidUid { key, source }),
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }

    /// Encode as a JSON object with sorted keys.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialisation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(&self.0).map_err(StoreError::Encode)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Uid> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Uid> {
        self.0.iter()
    }
}

impl FromIterator<(String, Uid)> for Deflated {
    fn from_iter<I: IntoIterator<Item = (String, Uid)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Deflated {
    type Item = (&'a String, &'a Uid);
    type IntoIter = btree_map::Iter<'a, String, Uid>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Records indexed by key.
///
/// # Examples
///
/// ```
/// use placebook_core::RecordStore;
/// use placebook_core::test_support::{restaurant, vatican_city};
///
/// let mut saved = RecordStore::new();
/// saved.add(restaurant(), Some("Lunch".to_owned()));
///
/// let mut fresh = RecordStore::new();
/// fresh.add(vatican_city(), None);
///
/// let combined = saved.combine(&fresh);
/// assert_eq!(combined.len(), 2);
/// assert!(combined.get("r999&boundary=administrative").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: BTreeMap<String, Record>,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` under `key`, or under its uid when no key is given.
    ///
    /// An existing entry with the same key is replaced. Returns the key used.
    pub fn add(&mut self, record: Record, key: Option<String>) -> String {
        let key = key.unwrap_or_else(|| record.uid().into());
        if self.records.insert(key.clone(), record).is_some() {
            debug!("replaced record stored under {key:?}");
        }
        key
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Record> {
        self.records.iter()
    }

    /// Map every key to its record's uid.
    #[must_use]
    pub fn deflate(&self) -> Deflated {
        self.records
            .iter()
            .map(|(key, record)| (key.clone(), record.uid()))
            .collect()
    }

    /// Encoded deflated form; the on-disk cache payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialisation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        self.deflate().to_bytes()
    }

    /// Entries of `self` overlaid with the entries of `other`.
    ///
    /// On a key collision the record from `other` wins. Neither input
    /// changes.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let mut records = self.records.clone();
        records.extend(
            other
                .records
                .iter()
                .map(|(key, record)| (key.clone(), record.clone())),
        );
        Self { records }
    }

    /// Rebuild full records from a deflated mapping, one lookup per entry.
    ///
    /// Lookups run in key order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ResolveError`] unchanged.
    pub fn inflate<R>(deflated: &Deflated, resolver: &R) -> Result<Self, ResolveError>
    where
        R: Resolver + ?Sized,
    {
        let mut store = Self::new();
        for (key, uid) in deflated {
            let record = resolver.lookup(uid.as_str())?;
            store.add(record, Some(key.clone()));
        }
        Ok(store)
    }

    /// Encode every field of every record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialisation fails.
    pub fn to_full_bytes(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self).map_err(StoreError::Encode)
    }

    /// Decode the output of [`RecordStore::to_full_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when the bytes are not a full store.
    pub fn from_full_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes).map_err(StoreError::Decode)
    }
}

impl FromIterator<(String, Record)> for RecordStore {
    fn from_iter<I: IntoIterator<Item = (String, Record)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl Extend<(String, Record)> for RecordStore {
    fn extend<I: IntoIterator<Item = (String, Record)>>(&mut self, iter: I) {
        for (key, record) in iter {
            self.add(record, Some(key));
        }
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = (&'a String, &'a Record);
    type IntoIter = btree_map::Iter<'a, String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
