//! A single place resolved by the geocoding service.
//!
//! [`Record`] values are built once from a [`RecordResponse`] and never
//! change afterwards. Coordinates are kept as exact decimals so that a
//! record survives serialisation without drifting.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use geo::{Coord, Rect};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uid::Uid;

/// OpenStreetMap element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    /// A single point.
    Node,
    /// An ordered list of nodes.
    Way,
    /// A group of elements.
    Relation,
}

impl OsmType {
    /// Lowercase initial used by uids (`n`, `w`, `r`).
    #[must_use]
    pub const fn initial(self) -> char {
        match self {
            Self::Node => 'n',
            Self::Way => 'w',
            Self::Relation => 'r',
        }
    }

    /// Map a uid or lookup initial back to the element kind, ignoring case.
    #[must_use]
    pub const fn from_initial(initial: char) -> Option<Self> {
        match initial.to_ascii_lowercase() {
            'n' => Some(Self::Node),
            'w' => Some(Self::Way),
            'r' => Some(Self::Relation),
            _ => None,
        }
    }

    /// Name as used by the service (`node`, `way`, `relation`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for OsmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsmType {
    type Err = RecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            other => Err(RecordError::UnknownOsmType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Corner coordinates of a place, in the service's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[Decimal; 4]", into = "[Decimal; 4]")]
pub struct BoundingBox {
    /// Minimum latitude.
    pub south: Decimal,
    /// Maximum latitude.
    pub north: Decimal,
    /// Minimum longitude.
    pub west: Decimal,
    /// Maximum longitude.
    pub east: Decimal,
}

impl BoundingBox {
    /// Approximate the box as a `geo` rectangle (`x = longitude`).
    ///
    /// Returns `None` when a corner does not fit an `f64`.
    #[must_use]
    pub fn to_rect(&self) -> Option<Rect<f64>> {
        let min = Coord {
            x: self.west.to_f64()?,
            y: self.south.to_f64()?,
        };
        let max = Coord {
            x: self.east.to_f64()?,
            y: self.north.to_f64()?,
        };
        Some(Rect::new(min, max))
    }
}

impl From<[Decimal; 4]> for BoundingBox {
    fn from([south, north, west, east]: [Decimal; 4]) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }
}

impl From<BoundingBox> for [Decimal; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.south, bbox.north, bbox.west, bbox.east]
    }
}

/// A JSON scalar that may arrive either as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A JSON number.
    Number(serde_json::Number),
    /// A JSON string.
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Text(text) => Cow::Borrowed(text.trim()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Raw place payload as returned by the service (`format=jsonv2`).
///
/// Numeric fields are kept loose here; [`Record::from_response`] performs the
/// validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResponse {
    /// Internal row id; not persistent across service imports.
    pub place_id: Scalar,
    /// Licence notice.
    #[serde(default)]
    pub licence: Option<String>,
    /// `node`, `way` or `relation`.
    pub osm_type: String,
    /// Element id within its `osm_type` namespace.
    pub osm_id: Scalar,
    /// Latitude of the centroid.
    pub lat: Scalar,
    /// Longitude of the centroid.
    pub lon: Scalar,
    /// Main tag key.
    #[serde(alias = "class")]
    pub category: String,
    /// Main tag value.
    #[serde(rename = "type")]
    pub subtype: String,
    /// Search rank.
    pub place_rank: Scalar,
    /// Importance estimate.
    pub importance: Scalar,
    /// Address type.
    #[serde(default)]
    pub addresstype: String,
    /// Localised name.
    #[serde(default)]
    pub name: String,
    /// Full comma-separated address.
    pub display_name: String,
    /// Address breakdown (only with `addressdetails=1`).
    #[serde(default)]
    pub address: Option<BTreeMap<String, String>>,
    /// Bounding box corners `[south, north, west, east]`.
    #[serde(default)]
    pub boundingbox: Option<Vec<Scalar>>,
}

/// Reasons a service payload cannot become a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field expected to hold a decimal did not parse.
    #[error("field {field} is not a decimal: {value:?}")]
    InvalidDecimal {
        /// Field name.
        field: &'static str,
        /// Offending text.
        value: String,
    },
    /// A field expected to hold a non-negative integer did not parse.
    #[error("field {field} is not an integer: {value:?}")]
    InvalidInteger {
        /// Field name.
        field: &'static str,
        /// Offending text.
        value: String,
    },
    /// A field expected to hold a finite real number did not parse.
    #[error("field {field} is not a real number: {value:?}")]
    InvalidReal {
        /// Field name.
        field: &'static str,
        /// Offending text.
        value: String,
    },
    /// `osm_type` was not `node`, `way` or `relation`.
    #[error("unknown OSM type {value:?}")]
    UnknownOsmType {
        /// Offending text.
        value: String,
    },
    /// A bounding box must hold zero or four corners.
    #[error("bounding box must have 4 corners, found {len}")]
    BoundingBoxLength {
        /// Number of corners supplied.
        len: usize,
    },
}

/// One resolved place.
///
/// # Examples
///
/// ```
/// use placebook_core::{Record, RecordResponse};
///
/// let response: RecordResponse = serde_json::from_str(r#"{
///     "place_id": 307468009,
///     "osm_type": "way",
///     "osm_id": 228034523,
///     "lat": "32.7940463",
///     "lon": "35.0200431",
///     "category": "amenity",
///     "type": "restaurant",
///     "place_rank": 30,
///     "importance": 0.00000999,
///     "addresstype": "amenity",
///     "name": "Burgeranch",
///     "display_name": "Burgeranch, HaKnesset, Haifa"
/// }"#)?;
/// let record = Record::from_response(response)?;
/// assert_eq!(record.uid().as_str(), "w228034523&amenity=restaurant");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    place_id: u64,
    #[serde(default)]
    licence: String,
    osm_type: OsmType,
    osm_id: u64,
    lat: Decimal,
    lon: Decimal,
    category: String,
    subtype: String,
    place_rank: u32,
    importance: f64,
    address_type: String,
    name: String,
    display_name: String,
    #[serde(default)]
    address: BTreeMap<String, String>,
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
}

impl Record {
    /// Validate a raw payload and build a record from it.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when a numeric field does not parse, the
    /// `osm_type` is unknown, or the bounding box is neither empty nor four
    /// corners long.
    pub fn from_response(response: RecordResponse) -> Result<Self, RecordError> {
        let RecordResponse {
            place_id,
            licence,
            osm_type,
            osm_id,
            lat,
            lon,
            category,
            subtype,
            place_rank,
            importance,
            addresstype,
            name,
            display_name,
            address,
            boundingbox,
        } = response;

        let rank = parse_integer("place_rank", &place_rank)?;
        let place_rank = u32::try_from(rank).map_err(|_| RecordError::InvalidInteger {
            field: "place_rank",
            value: rank.to_string(),
        })?;

        Ok(Self {
            place_id: parse_integer("place_id", &place_id)?,
            licence: licence.unwrap_or_default(),
            osm_type: osm_type.parse()?,
            osm_id: parse_integer("osm_id", &osm_id)?,
            lat: parse_decimal("lat", &lat)?,
            lon: parse_decimal("lon", &lon)?,
            category,
            subtype,
            place_rank,
            importance: parse_real("importance", &importance)?,
            address_type: addresstype,
            name,
            display_name,
            address: address.unwrap_or_default(),
            bounding_box: parse_bounding_box(boundingbox.as_deref())?,
        })
    }

    /// Stable identity derived from the OSM id and main tag.
    #[must_use]
    pub fn uid(&self) -> Uid {
        Uid::from_parts(self.osm_type, self.osm_id, &self.category, &self.subtype)
    }

    /// Identifier accepted by the lookup endpoint, e.g. `W228034523`.
    #[must_use]
    pub fn osm_lookup_id(&self) -> String {
        format!(
            "{}{}",
            self.osm_type.initial().to_ascii_uppercase(),
            self.osm_id
        )
    }

    /// Centroid as a `geo` coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        Some(Coord {
            x: self.lon.to_f64()?,
            y: self.lat.to_f64()?,
        })
    }

    /// Internal service row id.
    #[must_use]
    pub const fn place_id(&self) -> u64 {
        self.place_id
    }

    #[must_use]
    pub fn licence(&self) -> &str {
        &self.licence
    }

    #[must_use]
    pub const fn osm_type(&self) -> OsmType {
        self.osm_type
    }

    #[must_use]
    pub const fn osm_id(&self) -> u64 {
        self.osm_id
    }

    /// Latitude, exactly as reported.
    #[must_use]
    pub const fn lat(&self) -> Decimal {
        self.lat
    }

    /// Longitude, exactly as reported.
    #[must_use]
    pub const fn lon(&self) -> Decimal {
        self.lon
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    #[must_use]
    pub const fn place_rank(&self) -> u32 {
        self.place_rank
    }

    #[must_use]
    pub const fn importance(&self) -> f64 {
        self.importance
    }

    #[must_use]
    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Address breakdown; empty when the service returned none.
    #[must_use]
    pub const fn address(&self) -> &BTreeMap<String, String> {
        &self.address
    }

    #[must_use]
    pub const fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }
}

fn parse_decimal(field: &'static str, raw: &Scalar) -> Result<Decimal, RecordError> {
    let text = raw.as_text();
    Decimal::from_str(&text).map_err(|_| RecordError::InvalidDecimal {
        field,
        value: text.into_owned(),
    })
}

fn parse_integer(field: &'static str, raw: &Scalar) -> Result<u64, RecordError> {
    let text = raw.as_text();
    text.parse::<u64>().map_err(|_| RecordError::InvalidInteger {
        field,
        value: text.into_owned(),
    })
}

fn parse_real(field: &'static str, raw: &Scalar) -> Result<f64, RecordError> {
    let text = raw.as_text();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RecordError::InvalidReal {
            field,
            value: text.into_owned(),
        }),
    }
}

fn parse_bounding_box(corners: Option<&[Scalar]>) -> Result<Option<BoundingBox>, RecordError> {
    match corners {
        None | Some([]) => Ok(None),
        Some([south, north, west, east]) => Ok(Some(BoundingBox {
            south: parse_decimal("boundingbox", south)?,
            north: parse_decimal("boundingbox", north)?,
            west: parse_decimal("boundingbox", west)?,
            east: parse_decimal("boundingbox", east)?,
        })),
        Some(other) => Err(RecordError::BoundingBoxLength { len: other.len() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{response, restaurant_response};
    use rstest::rstest;

    #[rstest]
    fn builds_record_from_jsonv2_payload() {
        let record = Record::from_response(restaurant_response()).expect("valid payload");
        assert_eq!(record.osm_type(), OsmType::Way);
        assert_eq!(record.osm_id(), 228_034_523);
        assert_eq!(record.lat().to_string(), "32.7940463");
        assert_eq!(record.lon().to_string(), "35.0200431");
        assert_eq!(record.uid().as_str(), "w228034523&amenity=restaurant");
        assert_eq!(record.osm_lookup_id(), "W228034523");
    }

    #[rstest]
    fn keeps_decimal_precision() {
        let mut raw = restaurant_response();
        raw.lat = Scalar::from("41.90349120000000000001");
        let record = Record::from_response(raw).expect("valid payload");
        assert_eq!(record.lat().to_string(), "41.90349120000000000001");
    }

    #[rstest]
    fn uid_ignores_place_id() {
        let mut first = restaurant_response();
        let mut second = restaurant_response();
        first.place_id = Scalar::from(1_u64);
        second.place_id = Scalar::from("987654");
        let first = Record::from_response(first).expect("valid payload");
        let second = Record::from_response(second).expect("valid payload");
        assert_ne!(first.place_id(), second.place_id());
        assert_eq!(first.uid(), second.uid());
    }

    #[rstest]
    #[case("node", 'n')]
    #[case("way", 'w')]
    #[case("relation", 'r')]
    fn uid_uses_type_initial(#[case] osm_type: &str, #[case] initial: char) {
        let record = Record::from_response(response(osm_type, 42, "place", "city"))
            .expect("valid payload");
        assert_eq!(record.uid().as_str(), format!("{initial}42&place=city"));
    }

    #[rstest]
    fn rejects_unknown_osm_type() {
        let err = Record::from_response(response("area", 1, "place", "city"))
            .expect_err("unknown type");
        assert_eq!(
            err,
            RecordError::UnknownOsmType {
                value: "area".to_owned()
            }
        );
    }

    #[rstest]
    #[case::lat("lat")]
    #[case::lon("lon")]
    fn rejects_non_decimal_coordinates(#[case] field: &str) {
        let mut raw = restaurant_response();
        match field {
            "lat" => raw.lat = Scalar::from("north-ish"),
            _ => raw.lon = Scalar::from("12,5"),
        }
        let err = Record::from_response(raw).expect_err("bad coordinate");
        assert!(matches!(err, RecordError::InvalidDecimal { .. }));
    }

    #[rstest]
    fn rejects_non_integer_osm_id() {
        let mut raw = restaurant_response();
        raw.osm_id = Scalar::from("W228034523");
        let err = Record::from_response(raw).expect_err("bad id");
        assert!(matches!(
            err,
            RecordError::InvalidInteger {
                field: "osm_id",
                ..
            }
        ));
    }

    #[rstest]
    fn rejects_non_finite_importance() {
        let mut raw = restaurant_response();
        raw.importance = Scalar::from("NaN");
        let err = Record::from_response(raw).expect_err("bad importance");
        assert!(matches!(err, RecordError::InvalidReal { .. }));
    }

    #[rstest]
    #[case(0, true)]
    #[case(4, true)]
    #[case(2, false)]
    #[case(5, false)]
    fn bounding_box_must_be_empty_or_complete(#[case] corners: usize, #[case] valid: bool) {
        let mut raw = restaurant_response();
        raw.boundingbox = Some(vec![Scalar::from("1.5"); corners]);
        assert_eq!(Record::from_response(raw).is_ok(), valid);
    }

    #[rstest]
    fn missing_optional_fields_become_empty() {
        let mut raw = restaurant_response();
        raw.address = None;
        raw.boundingbox = None;
        raw.licence = None;
        let record = Record::from_response(raw).expect("valid payload");
        assert!(record.address().is_empty());
        assert!(record.bounding_box().is_none());
        assert!(record.licence().is_empty());
    }

    #[rstest]
    fn bounding_box_converts_to_rect() {
        let record = Record::from_response(restaurant_response()).expect("valid payload");
        let rect = record
            .bounding_box()
            .and_then(BoundingBox::to_rect)
            .expect("bounding box present");
        let centre = record.location().expect("location");
        assert!(rect.min().x <= centre.x && centre.x <= rect.max().x);
        assert!(rect.min().y <= centre.y && centre.y <= rect.max().y);
    }

    #[rstest]
    fn accepts_class_alias_and_numeric_strings() {
        let json = r#"{
            "place_id": "12",
            "osm_type": "node",
            "osm_id": "34",
            "lat": 1.25,
            "lon": "-0.5",
            "class": "shop",
            "type": "bakery",
            "place_rank": "30",
            "importance": "0.1",
            "display_name": "Bakery"
        }"#;
        let raw: RecordResponse = serde_json::from_str(json).expect("deserialise");
        let record = Record::from_response(raw).expect("valid payload");
        assert_eq!(record.uid().as_str(), "n34&shop=bakery");
        assert_eq!(record.lat().to_string(), "1.25");
    }
}
