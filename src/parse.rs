//! Response parsing - turns a raw transport [`Response`] into records.
//!
//! A response carries one of three shapes:
//!
//! - an error body (`code` / `message`), which always wins,
//! - a single resource, identified by a `content-location` or `location`
//!   header of the form `/<api-version>/<collection>/<key>/refs/<ref>`,
//! - a `results` array, one entry per resource.
//!
//! Anything else is "no data" and parses to [`Parsed::Empty`].

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::client::{Cursor, Response};
use crate::error::{ModelError, VERSION_MISMATCH_CODE};

const KEY_SEGMENT: usize = 3;
const REF_SEGMENT: usize = 5;

/// One resource pulled out of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub key: String,
    pub ref_: Option<String>,
    pub value: Value,
}

/// The shape of a parsed response.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Parsed {
    Single(ParsedRecord),
    Many(Vec<ParsedRecord>),
    #[default]
    Empty,
}

impl Parsed {
    /// Keep only the first record of a multi-resource result.
    pub fn first(self) -> Parsed {
        match self {
            Parsed::Many(records) => records
                .into_iter()
                .next()
                .map(Parsed::Single)
                .unwrap_or(Parsed::Empty),
            other => other,
        }
    }

    /// Key of the single record, if this is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Parsed::Single(record) => Some(&record.key),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Parsed::Empty)
    }
}

/// Parsed payload plus the pagination cursors that came with it.
#[derive(Debug, Clone, Default)]
pub struct ParsedResponse {
    pub parsed: Parsed,
    pub next: Option<Cursor>,
    pub prev: Option<Cursor>,
}

#[derive(Deserialize)]
struct ResultPath {
    key: String,
    #[serde(rename = "ref", default)]
    ref_: Option<String>,
}

#[derive(Deserialize)]
struct ResultEntry {
    path: ResultPath,
    #[serde(default)]
    value: Value,
}

/// Parse a transport response.
pub fn parse_response(resp: Response) -> Result<ParsedResponse, ModelError> {
    check_error(&resp.body)?;

    let location = resp
        .header("content-location")
        .or_else(|| resp.header("location"))
        .map(str::to_string);

    let parsed = if let Some(loc) = location {
        Parsed::Single(parse_location(&loc, resp.body)?)
    } else if let Some(results) = resp.body.get("results").filter(|r| r.is_array()) {
        let entries: Vec<ResultEntry> = serde_json::from_value(results.clone())?;
        Parsed::Many(
            entries
                .into_iter()
                .map(|entry| ParsedRecord {
                    key: entry.path.key,
                    ref_: entry.path.ref_,
                    value: entry.value,
                })
                .collect(),
        )
    } else {
        Parsed::Empty
    };

    Ok(ParsedResponse {
        parsed,
        next: resp.links.next,
        prev: resp.links.prev,
    })
}

fn check_error(body: &Value) -> Result<(), ModelError> {
    let code = match body.get("code").and_then(Value::as_str) {
        Some(code) if !code.is_empty() => code,
        _ => return Ok(()),
    };
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    warn!(code, message = %message, "server reported an error");

    if code == VERSION_MISMATCH_CODE {
        Err(ModelError::VersionConflict { message })
    } else {
        Err(ModelError::Server {
            code: code.to_string(),
            message,
        })
    }
}

fn parse_location(location: &str, body: Value) -> Result<ParsedRecord, ModelError> {
    let segments: Vec<&str> = location.split('/').collect();

    let key = segments
        .get(KEY_SEGMENT)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ModelError::InvalidLocation(location.to_string()))?;
    let ref_ = segments
        .get(REF_SEGMENT)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(ParsedRecord {
        key: key.to_string(),
        ref_,
        value: body,
    })
}
