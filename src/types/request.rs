//! Completion requests and results at the service boundary.

use crate::structured::ResponseFormat;
use crate::types::message::Message;
use crate::types::tool::{ToolCall, ToolDefinition};

/// How the request constrains the model.
///
/// A response schema and tool declarations are mutually exclusive at the service, so they
/// live in separate variants and can never be sent together.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestMode {
    #[default]
    Plain,
    Schema(ResponseFormat),
    Tools(Vec<ToolDefinition>),
}

impl RequestMode {
    pub fn name(&self) -> &'static str {
        match self {
            RequestMode::Plain => "plain",
            RequestMode::Schema(_) => "schema",
            RequestMode::Tools(_) => "tools",
        }
    }
}

/// One call to the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub transcript: Vec<Message>,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub mode: RequestMode,
}

impl GenerationRequest {
    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

    pub fn new(transcript: Vec<Message>) -> Self {
        Self {
            transcript,
            temperature: Self::DEFAULT_TEMPERATURE,
            max_output_tokens: Self::DEFAULT_MAX_OUTPUT_TOKENS,
            mode: RequestMode::Plain,
        }
    }

    /// Set temperature, clamped to `[0, 1]`. NaN falls back to the default.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = if temperature.is_nan() {
            Self::DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 1.0)
        };
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max.max(1);
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn response_schema(&self) -> Option<&ResponseFormat> {
        match &self.mode {
            RequestMode::Schema(format) => Some(format),
            _ => None,
        }
    }

    pub fn tool_declarations(&self) -> Option<&[ToolDefinition]> {
        match &self.mode {
            RequestMode::Tools(tools) => Some(tools),
            _ => None,
        }
    }
}

/// What the completion service returned for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResult {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: text.into(),
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_is_clamped() {
        let req = GenerationRequest::new(vec![]).temperature(1.7);
        assert_eq!(req.temperature, 1.0);
        let req = GenerationRequest::new(vec![]).temperature(-0.2);
        assert_eq!(req.temperature, 0.0);
        let req = GenerationRequest::new(vec![]).temperature(f64::NAN);
        assert_eq!(req.temperature, GenerationRequest::DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_zero_max_tokens_becomes_one() {
        let req = GenerationRequest::new(vec![]).max_output_tokens(0);
        assert_eq!(req.max_output_tokens, 1);
    }

    #[test]
    fn test_mode_accessors_are_exclusive() {
        let req = GenerationRequest::new(vec![]).mode(RequestMode::Schema(ResponseFormat::reasoning()));
        assert!(req.response_schema().is_some());
        assert!(req.tool_declarations().is_none());

        let req = GenerationRequest::new(vec![]).mode(RequestMode::Tools(crate::tools::available_tools()));
        assert!(req.response_schema().is_none());
        assert_eq!(req.tool_declarations().map(|t| t.len()), Some(1));
    }
}
