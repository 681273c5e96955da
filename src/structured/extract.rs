//! JSON extraction from free-form model output.
//!
//! Handles:
//! - ```` ```json ... ``` ```` and untagged ```` ``` ... ``` ```` fenced blocks, tried in order
//! - a language tag on its own line or on the same line as the object
//! - bare JSON making up the whole response
//!
//! A fenced object ends where its JSON value ends, so string values may themselves
//! contain backtick fences.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

const FENCE: &str = "```";

/// Optional language tag and the whitespace after it, at the start of a fence body.
static FENCE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_+.\-]*\s*").expect("fence tag pattern is valid"));

/// No JSON object could be located in the text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response is empty")]
    Empty,

    #[error("response is valid JSON but not an object")]
    NotAnObject,

    #[error("no JSON object found: {0}")]
    Invalid(#[source] serde_json::Error),
}

/// Object opening `body` (the text right after an opening fence), provided the fence
/// closes once the object ends.
fn fenced_object(body: &str) -> Option<Map<String, Value>> {
    let tag_len = FENCE_TAG.find(body).map_or(0, |m| m.end());
    let rest = &body[tag_len..];
    if !rest.starts_with('{') {
        return None;
    }

    let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    match values.next() {
        Some(Ok(Value::Object(map)))
            if rest[values.byte_offset()..].trim_start().starts_with(FENCE) =>
        {
            Some(map)
        }
        _ => None,
    }
}

/// Locate the structured object in `text`.
///
/// The first fenced block that holds a JSON object wins; otherwise the whole text
/// must be a JSON object.
pub fn extract(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let body = &rest[open + FENCE.len()..];
        if let Some(map) = fenced_object(body) {
            return Ok(map);
        }
        // Skip to the end of this block.
        rest = match body.find(FENCE) {
            Some(close) => &body[close + FENCE.len()..],
            None => break,
        };
    }

    let whole = text.trim();
    if whole.is_empty() {
        return Err(ExtractError::Empty);
    }
    match serde_json::from_str::<Value>(whole) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractError::NotAnObject),
        Err(e) => Err(ExtractError::Invalid(e)),
    }
}
