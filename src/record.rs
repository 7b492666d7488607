//! Post record schema and the field extractors shared by every strategy.
//!
//! Fields stay raw until an aggregate needs them, so one wrongly-typed or
//! unparsable field only disqualifies the record for the aggregates that read it.

use crate::date::PostDate;
use crate::error::{EngineError, Result};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

/// The four keys the aggregates read, captured as unparsed JSON text.
///
/// Every strategy decodes lines into this one shape, so a line is accepted or
/// rejected identically everywhere: repeating one of the four keys rejects
/// it, unknown keys are skipped. A field is parsed only when an aggregate asks
/// for it; one that fails to parse counts as missing for that aggregate only.
#[derive(Debug, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    date: Option<Box<RawValue>>,
    #[serde(default)]
    user: Option<Box<RawValue>>,
    #[serde(default)]
    content: Option<Box<RawValue>>,
    #[serde(default, rename = "mentionedUsers")]
    mentioned_users: Option<Box<RawValue>>,
}

fn parse_field(raw: &Option<Box<RawValue>>) -> Option<Value> {
    serde_json::from_str(raw.as_deref()?.get()).ok()
}

impl PostRecord {
    pub fn post_date(&self) -> Option<PostDate> {
        post_date_of(&parse_field(&self.date)?)
    }
    pub fn author(&self) -> Option<String> {
        author_of(&parse_field(&self.user)?).map(str::to_owned)
    }
    pub fn text(&self) -> Option<String> {
        text_of(&parse_field(&self.content)?).map(str::to_owned)
    }
    pub fn mentions(&self) -> Vec<String> {
        parse_field(&self.mentioned_users)
            .map(|v| mentions_of(&v).map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

pub fn post_date_of(v: &Value) -> Option<PostDate> {
    v.as_str().and_then(PostDate::from_timestamp)
}

/// The author handle lives in `user.username`; anything else is a missing author.
pub fn author_of(v: &Value) -> Option<&str> {
    v.as_object()?.get("username")?.as_str()
}

pub fn text_of(v: &Value) -> Option<&str> {
    v.as_str().filter(|s| !s.is_empty())
}

/// Handle of a single mention: either `{"username": ".."}` or a bare string.
pub fn handle_of(v: &Value) -> Option<&str> {
    match v {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("username").and_then(|u| u.as_str()),
        _ => None,
    }
}

/// Flatten a mention list. Non-arrays yield nothing.
pub fn mentions_of(v: &Value) -> impl Iterator<Item = &str> {
    v.as_array().into_iter().flatten().filter_map(handle_of)
}

/// Decode one NDJSON line.
///
/// Only JSON objects are accepted; serde would otherwise map a JSON array
/// onto the record's fields by position.
pub fn decode_line(line: &[u8], line_no: u64) -> Result<PostRecord> {
    match line.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => {}
        _ => {
            return Err(EngineError::MalformedRecord { line: line_no, reason: "not a JSON object".into() });
        }
    }
    let text = std::str::from_utf8(line)
        .map_err(|e| EngineError::MalformedRecord { line: line_no, reason: e.to_string() })?;
    serde_json::from_str(text).map_err(|e| EngineError::MalformedRecord { line: line_no, reason: e.to_string() })
}

/// Strip the line terminator; `None` for blank lines.
#[inline]
pub fn trim_line(mut line: &[u8]) -> Option<&[u8]> {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    if line.iter().all(|b| b.is_ascii_whitespace()) {
        None
    } else {
        Some(line)
    }
}
