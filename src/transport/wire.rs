//! Chat-completions wire format (OpenAI-compatible).

use crate::types::{CompletionResult, GenerationRequest, Message, MessageRole, RequestMode, ToolCall};
use crate::{Error, ErrorContext, Result};
use serde_json::{json, Map, Value};

/// Build the JSON body for `POST /chat/completions`.
///
/// The body carries `response_format` or `tools` according to the request mode,
/// never both.
pub fn encode_request(request: &GenerationRequest, model: &str) -> Value {
    let messages: Vec<Value> = request.transcript.iter().map(encode_message).collect();

    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature,
        "max_tokens": request.max_output_tokens,
    });

    match &request.mode {
        RequestMode::Plain => {}
        RequestMode::Schema(format) => {
            body["response_format"] = format.to_wire();
        }
        RequestMode::Tools(tools) => {
            body["tools"] = json!(tools);
        }
    }

    body
}

fn encode_message(message: &Message) -> Value {
    let mut obj = json!({
        "role": message.role.as_str(),
        "content": message.content,
    });
    match message.role {
        MessageRole::Tool => {
            if let Some(id) = &message.tool_call_id {
                obj["tool_call_id"] = Value::String(id.clone());
            }
            if let Some(name) = &message.tool_name {
                obj["name"] = Value::String(name.clone());
            }
        }
        MessageRole::Assistant if !message.tool_calls.is_empty() => {
            obj["tool_calls"] = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments,
                        }
                    })
                })
                .collect();
        }
        _ => {}
    }
    obj
}

/// Read the first choice of a chat-completions response.
///
/// A null message content becomes an empty string. Tool-call arguments are kept as
/// text; providers that send an object get it re-serialized.
pub fn decode_response(body: &Value) -> Result<CompletionResult> {
    let message = body.pointer("/choices/0/message").ok_or_else(|| {
        Error::validation_with_context(
            "response has no choices[0].message",
            ErrorContext::new()
                .with_field_path("choices[0].message")
                .with_source("wire_decoder"),
        )
    })?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().filter_map(decode_tool_call).collect())
        .unwrap_or_default();

    Ok(CompletionResult { text, tool_calls })
}

fn decode_tool_call(raw: &Value) -> Option<ToolCall> {
    let function = raw.get("function")?.as_object()?;
    let name = function.get("name")?.as_str()?;
    let id = raw.get("id").and_then(Value::as_str).unwrap_or_default();
    let arguments = match function.get("arguments") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => Value::Object(Map::new()).to_string(),
    };
    Some(ToolCall::new(id, name, arguments))
}

/// Pull a readable message out of an error response body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::ResponseFormat;
    use crate::tools::available_tools;

    fn transcript() -> Vec<Message> {
        vec![Message::system("sys"), Message::user("Calculate 2+2")]
    }

    #[test]
    fn test_encode_plain_request() {
        let req = GenerationRequest::new(transcript())
            .temperature(0.3)
            .max_output_tokens(256);
        let body = encode_request(&req, "llama-3.3-70b-versatile");
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "Calculate 2+2"}));
        assert!(body.get("response_format").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_encode_schema_mode() {
        let req = GenerationRequest::new(transcript())
            .mode(RequestMode::Schema(ResponseFormat::reasoning()));
        let body = encode_request(&req, "m");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body["response_format"]["schema"]["properties"]
            .get("reasoning_steps")
            .is_some());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_encode_tools_mode() {
        let req = GenerationRequest::new(transcript()).mode(RequestMode::Tools(available_tools()));
        let body = encode_request(&req, "m");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "calculate");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_encode_tool_round_trip_messages() {
        let call = ToolCall::new("call_9", "calculate", r#"{"expression":"2+2"}"#);
        let mut messages = transcript();
        messages.push(Message::assistant_with_tool_calls("", vec![call]));
        messages.push(Message::tool("call_9", "calculate", r#"{"result": 4}"#));
        let body = encode_request(&GenerationRequest::new(messages), "m");

        let assistant = &body["messages"][2];
        assert_eq!(assistant["tool_calls"][0]["id"], "call_9");
        assert_eq!(assistant["tool_calls"][0]["function"]["arguments"], r#"{"expression":"2+2"}"#);

        let tool = &body["messages"][3];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_9");
        assert_eq!(tool["name"], "calculate");
        assert_eq!(tool["content"], r#"{"result": 4}"#);
    }

    #[test]
    fn test_decode_text_response() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi"}, "finish_reason": "stop"}]
        });
        let result = decode_response(&body).unwrap();
        assert_eq!(result.text, "Hi");
        assert!(!result.has_tool_calls());
    }

    #[test]
    fn test_decode_tool_calls_with_null_content() {
        let body = json!({
            "choices": [{"message": {
                "content": null,
                "tool_calls": [
                    {"id": "c1", "type": "function", "function": {"name": "calculate", "arguments": "{\"expression\":\"1+1\"}"}},
                    {"id": "c2", "type": "function", "function": {"name": "calculate", "arguments": {"expression": "3"}}},
                    {"id": "c3", "type": "function"}
                ]
            }}]
        });
        let result = decode_response(&body).unwrap();
        assert_eq!(result.text, "");
        assert_eq!(result.tool_calls.len(), 2);
        assert_eq!(result.tool_calls[0].arguments, r#"{"expression":"1+1"}"#);
        assert_eq!(
            result.tool_calls[1].parsed_arguments().unwrap(),
            json!({"expression": "3"})
        );
    }

    #[test]
    fn test_decode_without_choices_fails() {
        let err = decode_response(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_error_message_prefers_provider_message() {
        assert_eq!(
            error_message(r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#),
            "Invalid API Key"
        );
        assert_eq!(error_message("  upstream down \n"), "upstream down");
    }
}
