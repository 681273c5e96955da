//! Reasoning outcomes.
//!
//! A [`ReasoningResult`] always serializes to one of four key shapes:
//!
//! | Variant | JSON |
//! |---------|------|
//! | `Structured` | the model's object verbatim (`reasoning_steps`, `final_answer`, ...), plus `"structured": true` once confirmed by the fallback controller |
//! | `Content` | `{"content": ...}` |
//! | `Unstructured` | `{"content": ..., "structured": false}` |
//! | `Failed` | `{"error": ...}` |

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// What the model intends after a reasoning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Continue,
    FinalAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub title: String,
    pub content: String,
    pub next_action: NextAction,
}

/// Typed view of a structured answer.
///
/// The last step is expected to carry `final_answer`, but a trailing `continue` is
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningOutput {
    pub reasoning_steps: Vec<ReasoningStep>,
    pub final_answer: String,
}

impl ReasoningOutput {
    pub fn last_step(&self) -> Option<&ReasoningStep> {
        self.reasoning_steps.last()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningResult {
    /// Object extracted from the model output, kept exactly as the model produced it.
    Structured {
        output: Map<String, Value>,
        confirmed: bool,
    },
    /// Free text returned when structured output was not requested.
    Content { content: String },
    /// Structured output was requested but could not be obtained.
    Unstructured { content: String },
    /// Every attempt failed.
    Failed { error: String },
}

impl ReasoningResult {
    pub fn structured(output: Map<String, Value>) -> Self {
        ReasoningResult::Structured {
            output,
            confirmed: false,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        ReasoningResult::Content {
            content: content.into(),
        }
    }

    pub fn unstructured(content: impl Into<String>) -> Self {
        ReasoningResult::Unstructured {
            content: content.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ReasoningResult::Failed {
            error: error.into(),
        }
    }

    /// Mark a structured result as confirmed; other variants pass through unchanged.
    pub fn confirm(self) -> Self {
        match self {
            ReasoningResult::Structured { output, .. } => ReasoningResult::Structured {
                output,
                confirmed: true,
            },
            other => other,
        }
    }

    /// True when the result carries an `error` key.
    pub fn is_error(&self) -> bool {
        match self {
            ReasoningResult::Failed { .. } => true,
            ReasoningResult::Structured { output, .. } => output.contains_key("error"),
            _ => false,
        }
    }

    /// True when the result carries `structured: false`.
    pub fn is_unstructured(&self) -> bool {
        match self {
            ReasoningResult::Unstructured { .. } => true,
            ReasoningResult::Structured { output, .. } => {
                output.get("structured") == Some(&Value::Bool(false))
            }
            _ => false,
        }
    }

    /// Text of the `error` key, if any.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ReasoningResult::Failed { error } => Some(error.clone()),
            ReasoningResult::Structured { output, .. } => output.get("error").map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }

    pub fn content_text(&self) -> Option<&str> {
        match self {
            ReasoningResult::Content { content } | ReasoningResult::Unstructured { content } => {
                Some(content)
            }
            _ => None,
        }
    }

    /// Typed view of a structured object; `None` when it does not fit the reasoning shape.
    pub fn reasoning_output(&self) -> Option<ReasoningOutput> {
        match self {
            ReasoningResult::Structured { output, .. } => {
                serde_json::from_value(Value::Object(output.clone())).ok()
            }
            _ => None,
        }
    }

    pub fn final_answer(&self) -> Option<&str> {
        match self {
            ReasoningResult::Structured { output, .. } => {
                output.get("final_answer").and_then(Value::as_str)
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for ReasoningResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReasoningResult::Structured { output, confirmed } => {
                let mut map = serializer.serialize_map(None)?;
                for (k, v) in output {
                    if *confirmed && k == "structured" {
                        continue;
                    }
                    map.serialize_entry(k, v)?;
                }
                if *confirmed {
                    map.serialize_entry("structured", &true)?;
                }
                map.end()
            }
            ReasoningResult::Content { content } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("content", content)?;
                map.end()
            }
            ReasoningResult::Unstructured { content } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("content", content)?;
                map.serialize_entry("structured", &false)?;
                map.end()
            }
            ReasoningResult::Failed { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
