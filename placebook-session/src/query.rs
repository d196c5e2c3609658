//! `KEY=QUERY` arguments for searches and lookups.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors returned when parsing a [`KeyedQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParseError {
    /// The argument was empty or only whitespace.
    #[error("query must not be empty")]
    EmptyQuery,
    /// `=QUERY` with nothing before the `=`.
    #[error("key before '=' must not be empty in {0:?}")]
    EmptyKey(String),
    /// `KEY=` with nothing after the `=`.
    #[error("query after '=' must not be empty in {0:?}")]
    EmptyValue(String),
    /// The text before `=` holds an `&` that does not start a parameter name.
    #[error("key before '=' must not contain '&' in {0:?}")]
    AmpersandInKey(String),
}

/// A search or lookup argument with an optional store key.
///
/// `KEY=QUERY` splits on the first `=`, so the query itself may contain
/// further `=` characters. An argument without `=` is a bare query; the
/// resolved record is then stored under its uid.
///
/// Keys never contain `&`. When the text before the first `=` ends in
/// `&name` with `name` free of whitespace, as in
/// `w228034523&amenity=restaurant`, the argument is a bare query carrying an
/// extra service parameter. Any other `&` before the `=` is rejected.
///
/// # Examples
///
/// ```
/// use placebook_session::KeyedQuery;
///
/// let pope: KeyedQuery = "The Pope=Vatican City".parse()?;
/// assert_eq!(pope.key(), Some("The Pope"));
/// assert_eq!(pope.query(), "Vatican City");
///
/// let bare: KeyedQuery = "W228034523".parse()?;
/// assert_eq!(bare.key(), None);
/// # Ok::<(), placebook_session::QueryParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedQuery {
    key: Option<String>,
    query: String,
}

impl KeyedQuery {
    /// A query stored under an explicit key.
    #[must_use]
    pub fn keyed(key: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            query: query.into(),
        }
    }

    /// A query stored under the resolved record's uid.
    #[must_use]
    pub fn bare(query: impl Into<String>) -> Self {
        Self {
            key: None,
            query: query.into(),
        }
    }

    /// Explicit store key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Text sent to the resolver.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl FromStr for KeyedQuery {
    type Err = QueryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(QueryParseError::EmptyQuery);
        }
        let Some((key, query)) = raw.split_once('=') else {
            return Ok(Self::bare(raw.trim()));
        };
        if let Some((_, param)) = key.rsplit_once('&') {
            if param.is_empty() || param.contains(char::is_whitespace) {
                return Err(QueryParseError::AmpersandInKey(raw.to_owned()));
            }
            return Ok(Self::bare(raw.trim()));
        }
        let (key, query) = (key.trim(), query.trim());
        if key.is_empty() {
            return Err(QueryParseError::EmptyKey(raw.to_owned()));
        }
        if query.is_empty() {
            return Err(QueryParseError::EmptyValue(raw.to_owned()));
        }
        Ok(Self::keyed(key, query))
    }
}

impl fmt::Display for KeyedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}={}", self.query),
            None => f.write_str(&self.query),
        }
    }
}

/// Parse every argument, preserving order.
///
/// # Errors
///
/// Returns the first [`QueryParseError`] encountered.
pub fn parse_keyed_queries<S: AsRef<str>>(raw: &[S]) -> Result<Vec<KeyedQuery>, QueryParseError> {
    raw.iter().map(|arg| arg.as_ref().parse()).collect()
}
