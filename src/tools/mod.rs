//! Tools the model may invoke during a reasoning query.
//!
//! The tool set is fixed: a single `calculate` function backed by the sandboxed
//! [`calculator`].

pub mod calculator;

use crate::types::{ToolCall, ToolDefinition};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const CALCULATE_TOOL: &str = "calculate";

static AVAILABLE_TOOLS: Lazy<Vec<ToolDefinition>> = Lazy::new(|| vec![calculator_tool()]);

/// Declaration of the `calculate` tool.
pub fn calculator_tool() -> ToolDefinition {
    ToolDefinition::function(
        CALCULATE_TOOL,
        "Evaluate a mathematical expression",
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate"
                }
            },
            "required": ["expression"]
        }),
    )
}

/// Every tool declared to the model when tools are enabled.
pub fn available_tools() -> Vec<ToolDefinition> {
    AVAILABLE_TOOLS.clone()
}

/// Run one tool call and return its JSON result.
///
/// Returns `None` for unknown tool names and for arguments that are not JSON or
/// lack a string `expression`. Such calls get no result message.
pub fn dispatch(call: &ToolCall) -> Option<Value> {
    if call.name != CALCULATE_TOOL {
        warn!(tool = %call.name, call_id = %call.id, "Skipping unknown tool call");
        return None;
    }

    let arguments = match call.parsed_arguments() {
        Ok(arguments) => arguments,
        Err(e) => {
            warn!(call_id = %call.id, error = %e, "Skipping tool call with unparseable arguments");
            return None;
        }
    };
    let Some(expression) = arguments.get("expression").and_then(Value::as_str) else {
        warn!(call_id = %call.id, "Skipping tool call without an expression argument");
        return None;
    };

    debug!(call_id = %call.id, expression, "Dispatching calculate");
    Some(calculator::evaluate(expression).to_json())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculator_declaration_shape() {
        let value = serde_json::to_value(calculator_tool()).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "calculate");
        assert_eq!(
            value["function"]["description"],
            "Evaluate a mathematical expression"
        );
        assert_eq!(
            value["function"]["parameters"]["required"],
            json!(["expression"])
        );
        assert_eq!(
            value["function"]["parameters"]["properties"]["expression"]["type"],
            "string"
        );
        assert_eq!(available_tools(), vec![calculator_tool()]);
    }

    #[test]
    fn test_dispatch_calculate() {
        let call = ToolCall::new("call_1", "calculate", r#"{"expression": "2+2"}"#);
        assert_eq!(dispatch(&call), Some(json!({"result": 4})));
    }

    #[test]
    fn test_dispatch_passes_evaluator_errors_through() {
        let call = ToolCall::new("call_1", "calculate", r#"{"expression": "import os"}"#);
        assert_eq!(
            dispatch(&call),
            Some(json!({"error": "invalid or unsafe expression"}))
        );
    }

    #[test]
    fn test_dispatch_skips_bad_calls() {
        assert_eq!(
            dispatch(&ToolCall::new("a", "search", r#"{"expression": "1"}"#)),
            None
        );
        assert_eq!(dispatch(&ToolCall::new("b", "calculate", "{not json")), None);
        assert_eq!(dispatch(&ToolCall::new("c", "calculate", r#"{"expr": "1"}"#)), None);
        assert_eq!(
            dispatch(&ToolCall::new("d", "calculate", r#"{"expression": 4}"#)),
            None
        );
    }
}
