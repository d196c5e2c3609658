//! Nominatim response bodies for the `search` and `lookup` endpoints.
//!
//! Both endpoints answer `format=jsonv2` requests with a JSON array of
//! places, best match first. Failures come back as an object carrying an
//! `error` member, either a bare string or `{ "code": .., "message": .. }`.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Output/>

use placebook_core::{Endpoint, Record, RecordResponse, ResolveError};
use serde::Deserialize;

/// Top-level body returned by Nominatim.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResponseBody {
    /// Matching places. Elements stay untyped until the first is chosen.
    Places(Vec<serde_json::Value>),
    /// Service-reported failure.
    Failure { error: ErrorDetail },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Text(String),
    Detailed {
        #[serde(default)]
        code: Option<u16>,
        message: String,
    },
}

impl ErrorDetail {
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Text(message) => message.clone(),
            Self::Detailed {
                code: Some(code),
                message,
            } => format!("{code}: {message}"),
            Self::Detailed {
                code: None,
                message,
            } => message.clone(),
        }
    }
}

/// Turn a successful response body into the first matching record.
pub(crate) fn first_record(
    endpoint: Endpoint,
    query: &str,
    url: &str,
    body: &str,
) -> Result<Record, ResolveError> {
    let parsed: ResponseBody =
        serde_json::from_str(body).map_err(|err| ResolveError::MalformedResponse {
            message: err.to_string(),
        })?;

    let places = match parsed {
        ResponseBody::Places(places) => places,
        ResponseBody::Failure { error } => {
            return Err(ResolveError::ServiceUnavailable {
                url: url.to_owned(),
                message: error.message(),
            });
        }
    };

    let Some(first) = places.into_iter().next() else {
        return Err(ResolveError::NoMatch {
            endpoint,
            query: query.to_owned(),
        });
    };

    let response: RecordResponse =
        serde_json::from_value(first).map_err(|err| ResolveError::MalformedResponse {
            message: err.to_string(),
        })?;
    Ok(Record::from_response(response)?)
}

/// Best-effort message for a non-success HTTP status.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ResponseBody>(body) {
        Ok(ResponseBody::Failure { error }) => format!("HTTP {status}: {}", error.message()),
        _ => format!("HTTP {status}"),
    }
}
