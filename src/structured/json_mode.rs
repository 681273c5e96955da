//! JSON mode descriptor for structured output requests.
//!
//! A [`ResponseFormat`] is the "response schema" half of a request. It is only ever sent
//! in [`RequestMode::Schema`](crate::types::RequestMode::Schema).

use crate::structured::schema::reasoning_step_schema;

/// `response_format` type for JSON object mode.
const JSON_OBJECT: &str = "json_object";

/// Response schema descriptor.
///
/// The service guarantees a JSON object; the schema it carries is advisory.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    pub schema: serde_json::Value,
}

impl ResponseFormat {
    /// JSON object mode carrying the reasoning-step schema.
    pub fn reasoning() -> Self {
        Self {
            schema: reasoning_step_schema().clone(),
        }
    }

    /// Value for the chat-completions `response_format` field.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "type": JSON_OBJECT,
            "schema": self.schema,
        })
    }
}
