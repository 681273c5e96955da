//! Transcript messages exchanged with the completion service.

use crate::types::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// A single role-tagged transcript entry.
///
/// Order in the transcript is causal conversation order and is never rearranged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// For `tool` messages: the id of the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For `tool` messages: the name of the tool that produced the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// For `assistant` messages: the tool invocations the model requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    fn with_role(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: text.into(),
            tool_call_id: None,
            tool_name: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, text)
    }

    /// Assistant turn that requested tool invocations.
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::with_role(MessageRole::Assistant, text)
        }
    }

    /// Tool result linked back to the originating call.
    pub fn tool(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            tool_name: Some(tool_name.into()),
            ..Self::with_role(MessageRole::Tool, content)
        }
    }

    /// Append text to the message body.
    pub fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn mentions_json(&self) -> bool {
        self.content.to_lowercase().contains("json")
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}
