//! Tool calling definitions

use serde::{Deserialize, Serialize};

/// Tool definition (for function calling)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters: Some(parameters),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Option<serde_json::Value>, // JSON Schema
}

/// Tool call (invocation from model)
///
/// `arguments` is the raw JSON text the model produced; it is only parsed when the
/// call is dispatched, so malformed arguments survive until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument text as a JSON value.
    pub fn parsed_arguments(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_definition_shape() {
        let tool = ToolDefinition::function("lookup", "Look it up", json!({"type": "object"}));
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "lookup");
        assert_eq!(value["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_parsed_arguments() {
        let call = ToolCall::new("c1", "calculate", r#"{"expression": "1+1"}"#);
        assert_eq!(call.parsed_arguments().unwrap()["expression"], "1+1");

        let broken = ToolCall::new("c2", "calculate", "{expression");
        assert!(broken.parsed_arguments().is_err());
    }
}
