//! Derived place identity.
//!
//! A uid has the shape `<n|w|r><osm id>&<category>=<subtype>`. The
//! `&category=subtype` suffix doubles as an extra query parameter when the
//! uid is handed to the lookup endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::OsmType;

/// Stable identifier of a [`crate::Record`].
///
/// The text form is kept alongside its parsed parts; ordering and equality
/// follow the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid {
    text: String,
    osm_type: OsmType,
    osm_id: u64,
    category: String,
    subtype: String,
}

/// Errors returned when parsing a [`Uid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UidError {
    /// The `&` separating the id from the tag was missing.
    #[error("uid {0:?} is missing the '&' tag separator")]
    MissingTag(String),
    /// The `=` separating tag key and value was missing.
    #[error("uid {0:?} is missing the '=' in its tag")]
    MissingTagValue(String),
    /// The leading type initial was not `n`, `w` or `r`.
    #[error("uid {0:?} does not start with n, w or r")]
    UnknownType(String),
    /// The id part was not a number.
    #[error("uid {0:?} has a non-numeric OSM id")]
    InvalidId(String),
    /// The text parses but is not how the uid is written, e.g. an uppercase
    /// initial or leading zeros.
    #[error("uid {found:?} is not canonical; expected {canonical:?}")]
    NonCanonical {
        /// Text as given.
        found: String,
        /// Text the same parts render to.
        canonical: String,
    },
}

impl Uid {
    pub(crate) fn from_parts(osm_type: OsmType, osm_id: u64, category: &str, subtype: &str) -> Self {
        Self {
            text: format!("{}{osm_id}&{category}={subtype}", osm_type.initial()),
            osm_type,
            osm_id,
            category: category.to_owned(),
            subtype: subtype.to_owned(),
        }
    }

    /// The uid text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Element kind encoded in the uid.
    #[must_use]
    pub const fn osm_type(&self) -> OsmType {
        self.osm_type
    }

    /// OSM id encoded in the uid.
    #[must_use]
    pub const fn osm_id(&self) -> u64 {
        self.osm_id
    }

    /// Tag key and value encoded in the uid.
    #[must_use]
    pub fn tag(&self) -> (&str, &str) {
        (&self.category, &self.subtype)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Uid {
    type Err = UidError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (id, tag) = value
            .split_once('&')
            .ok_or_else(|| UidError::MissingTag(value.to_owned()))?;
        let (category, subtype) = tag
            .split_once('=')
            .ok_or_else(|| UidError::MissingTagValue(value.to_owned()))?;
        let mut chars = id.chars();
        let osm_type = chars
            .next()
            .and_then(OsmType::from_initial)
            .ok_or_else(|| UidError::UnknownType(value.to_owned()))?;
        let osm_id: u64 = chars
            .as_str()
            .parse()
            .map_err(|_| UidError::InvalidId(value.to_owned()))?;
        let uid = Self::from_parts(osm_type, osm_id, category, subtype);
        if uid.text != value {
            return Err(UidError::NonCanonical {
                found: value.to_owned(),
                canonical: uid.text,
            });
        }
        Ok(uid)
    }
}

impl TryFrom<String> for Uid {
    type Error = UidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.text
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
