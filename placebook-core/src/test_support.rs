//! Test doubles and sample records shared by unit and behaviour tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::record::{RecordResponse, Scalar};
use crate::resolve::{Endpoint, ResolveError, Resolver};
use crate::Record;

/// Raw payload for a place with the given identity and fixed filler fields.
#[must_use]
pub fn response(osm_type: &str, osm_id: u64, category: &str, subtype: &str) -> RecordResponse {
    RecordResponse {
        place_id: Scalar::from(osm_id.wrapping_add(100_000)),
        licence: Some("Data © OpenStreetMap contributors, ODbL 1.0.".to_owned()),
        osm_type: osm_type.to_owned(),
        osm_id: Scalar::from(osm_id),
        lat: Scalar::from("41.9034912"),
        lon: Scalar::from("12.4528349"),
        category: category.to_owned(),
        subtype: subtype.to_owned(),
        place_rank: Scalar::from(30_u64),
        importance: Scalar::from("0.5"),
        addresstype: subtype.to_owned(),
        name: format!("{category} {subtype}"),
        display_name: format!("{category} {subtype}, Somewhere"),
        address: None,
        boundingbox: None,
    }
}

/// Build a record from [`response`].
///
/// # Panics
///
/// Panics when `osm_type` is not a valid OSM element kind.
#[must_use]
pub fn record(osm_type: &str, osm_id: u64, category: &str, subtype: &str) -> Record {
    Record::from_response(response(osm_type, osm_id, category, subtype))
        .unwrap_or_else(|err| panic!("invalid sample record: {err}"))
}

/// Raw payload for the Burgeranch restaurant, way 228034523.
#[must_use]
pub fn restaurant_response() -> RecordResponse {
    RecordResponse {
        place_id: Scalar::from(307_468_009_u64),
        lat: Scalar::from("32.7940463"),
        lon: Scalar::from("35.0200431"),
        name: "Burgeranch".to_owned(),
        display_name: "Burgeranch, HaKnesset, Haifa, Israel".to_owned(),
        address: Some(
            [
                ("amenity", "Burgeranch"),
                ("road", "HaKnesset"),
                ("city", "Haifa"),
                ("country_code", "il"),
            ]
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect(),
        ),
        boundingbox: Some(
            ["32.7939463", "32.7941463", "35.0199431", "35.0201431"]
                .into_iter()
                .map(Scalar::from)
                .collect(),
        ),
        ..response("way", 228_034_523, "amenity", "restaurant")
    }
}

/// The Burgeranch restaurant; uid `w228034523&amenity=restaurant`.
///
/// # Panics
///
/// Never in practice; the sample payload is valid.
#[must_use]
pub fn restaurant() -> Record {
    Record::from_response(restaurant_response())
        .unwrap_or_else(|err| panic!("invalid sample record: {err}"))
}

/// Vatican City; uid `r999&boundary=administrative`.
#[must_use]
pub fn vatican_city() -> Record {
    record("relation", 999, "boundary", "administrative")
}

/// Deterministic [`Resolver`] returning canned answers and recording calls.
///
/// Unknown queries yield [`ResolveError::NoMatch`].
#[derive(Debug, Default)]
pub struct StubResolver {
    searches: HashMap<String, Result<Record, ResolveError>>,
    lookups: HashMap<String, Result<Record, ResolveError>>,
    calls: RefCell<Vec<(Endpoint, String)>>,
}

impl StubResolver {
    /// Answer `query` on the search endpoint with `record`.
    #[must_use]
    pub fn with_search(mut self, query: &str, record: Record) -> Self {
        self.searches.insert(query.to_owned(), Ok(record));
        self
    }

    /// Answer `osm_ids` on the lookup endpoint with `record`.
    #[must_use]
    pub fn with_lookup(mut self, osm_ids: &str, record: Record) -> Self {
        self.lookups.insert(osm_ids.to_owned(), Ok(record));
        self
    }

    /// Fail `query` on the search endpoint with `error`.
    #[must_use]
    pub fn with_search_error(mut self, query: &str, error: ResolveError) -> Self {
        self.searches.insert(query.to_owned(), Err(error));
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(Endpoint, String)> {
        self.calls.borrow().clone()
    }

    /// Arguments of the lookup calls made so far, in order.
    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|(endpoint, _)| *endpoint == Endpoint::Lookup)
            .map(|(_, query)| query.clone())
            .collect()
    }

    fn answer(
        &self,
        endpoint: Endpoint,
        table: &HashMap<String, Result<Record, ResolveError>>,
        query: &str,
    ) -> Result<Record, ResolveError> {
        self.calls.borrow_mut().push((endpoint, query.to_owned()));
        table.get(query).cloned().unwrap_or_else(|| {
            Err(ResolveError::NoMatch {
                endpoint,
                query: query.to_owned(),
            })
        })
    }
}

impl Resolver for StubResolver {
    fn search(&self, query: &str) -> Result<Record, ResolveError> {
        self.answer(Endpoint::Search, &self.searches, query)
    }

    fn lookup(&self, osm_ids: &str) -> Result<Record, ResolveError> {
        self.answer(Endpoint::Lookup, &self.lookups, osm_ids)
    }
}
