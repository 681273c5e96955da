//! Core type definitions for the reasoning runtime.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Role-tagged transcript entry |
//! | [`MessageRole`] | Message role (system, user, assistant, tool) |
//! | [`ToolCall`] | Tool invocation requested by the model |
//! | [`ToolDefinition`] | Tool declaration sent to the model |
//! | [`GenerationRequest`] | One call to the completion service |
//! | [`CompletionResult`] | Text and tool calls returned by the service |
//! | [`ReasoningResult`] | Outcome of a reasoning query |
//!
//! ## Example
//!
//! ```rust
//! use cot_reasoner::types::{GenerationRequest, Message, ToolDefinition};
//!
//! let transcript = vec![
//!     Message::system("You are a helpful assistant"),
//!     Message::user("What is 2+2?"),
//! ];
//! let request = GenerationRequest::new(transcript).temperature(0.2);
//! assert!(request.response_schema().is_none());
//!
//! let tool = ToolDefinition::function(
//!     "calculate",
//!     "Evaluate a mathematical expression",
//!     serde_json::json!({"type": "object"}),
//! );
//! assert_eq!(tool.name(), "calculate");
//! ```

pub mod message;
pub mod request;
pub mod result;
pub mod tool;

pub use message::{Message, MessageRole};
pub use request::{CompletionResult, GenerationRequest, RequestMode};
pub use result::{NextAction, ReasoningOutput, ReasoningResult, ReasoningStep};
pub use tool::{FunctionDefinition, ToolCall, ToolDefinition};
