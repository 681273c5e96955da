use super::orchestrator::ensure_json_mention;
use super::prompts;
use super::Reasoner;
use crate::client::ScriptedCompletionService;
use crate::types::{CompletionResult, Message, MessageRole, ReasoningResult, ToolCall};
use crate::Error;
use serde_json::json;
use std::sync::Arc;

const STRUCTURED_ANSWER: &str = r#"{"reasoning_steps": [{"title": "Add", "content": "2+2=4", "next_action": "final_answer"}], "final_answer": "4"}"#;

fn reasoner(service: &Arc<ScriptedCompletionService>, use_tools: bool) -> Reasoner {
    Reasoner::new(service.clone(), use_tools)
}

fn calculate_call(id: &str, expression: &str) -> ToolCall {
    ToolCall::new(
        id,
        "calculate",
        json!({ "expression": expression }).to_string(),
    )
}

#[tokio::test]
async fn test_plain_output_is_never_extracted() {
    let service = Arc::new(ScriptedCompletionService::default().reply(STRUCTURED_ANSWER));
    let result = reasoner(&service, false).process("q", 0.7, false).await.unwrap();

    assert_eq!(result, ReasoningResult::content(STRUCTURED_ANSWER));
    assert_eq!(result.to_value(), json!({ "content": STRUCTURED_ANSWER }));

    let request = &service.requests()[0];
    assert!(request.response_schema().is_none());
    assert!(request.tool_declarations().is_none());
}

#[tokio::test]
async fn test_schema_mode_without_tools() {
    let service = Arc::new(ScriptedCompletionService::default().reply(STRUCTURED_ANSWER));
    let result = reasoner(&service, false).process("2+2?", 0.5, true).await.unwrap();

    assert_eq!(result.final_answer(), Some("4"));
    let request = &service.requests()[0];
    assert!(request.response_schema().is_some());
    assert!(request.tool_declarations().is_none());
    assert_eq!(request.temperature, 0.5);
    assert_eq!(request.max_output_tokens, 4000);
    // The system prompt already mentions JSON, so the user message is left alone.
    assert!(!request.transcript[1].content.ends_with(prompts::JSON_REMINDER));
}

#[test]
fn test_json_reminder_appended_when_nothing_mentions_json() {
    let system = Message::system("You are a careful assistant.");
    let mut user = Message::user("What is 2+2?");
    ensure_json_mention(&system, &mut user);
    assert_eq!(user.content, format!("What is 2+2?{}", prompts::JSON_REMINDER));
    assert!(user.mentions_json());
}

#[test]
fn test_json_reminder_skipped_when_a_message_mentions_json() {
    let mut user = Message::user("What is 2+2?");
    ensure_json_mention(&Message::system("Reply in json."), &mut user);
    assert_eq!(user.content, "What is 2+2?");

    let mut user = Message::user("Give me JSON: what is 2+2?");
    ensure_json_mention(&Message::system("You are a careful assistant."), &mut user);
    assert_eq!(user.content, "Give me JSON: what is 2+2?");
}

#[test]
fn test_reasoning_prompts_need_no_json_reminder() {
    let service = Arc::new(ScriptedCompletionService::default());
    let request = reasoner(&service, false).build_request("anything", 0.7, true);
    let mentions = request.transcript.iter().any(|m| m.mentions_json());
    assert!(mentions);
    assert_eq!(request.transcript[1].content, prompts::reasoning_prompt("anything"));
}

#[test]
fn test_tools_mode_never_carries_a_schema() {
    let service = Arc::new(ScriptedCompletionService::default());
    let reasoner = reasoner(&service, true);

    for structured in [true, false] {
        let request = reasoner.build_request("q", 0.7, structured);
        assert!(request.response_schema().is_none());
        assert_eq!(request.tool_declarations().map(|t| t.len()), Some(1));
    }

    let structured = reasoner.build_request("q", 0.7, true);
    assert!(structured.transcript[0]
        .content
        .ends_with(prompts::JSON_SHAPE_INSTRUCTIONS));
    let plain = reasoner.build_request("q", 0.7, false);
    assert_eq!(plain.transcript[0].content, prompts::SYSTEM_PROMPT);
}

#[tokio::test]
async fn test_tool_round_trip() {
    let second = r#"Here you go: ```json
{"reasoning_steps": [{"title": "Use tool", "content": "2+2 is 4", "next_action": "final_answer"}], "final_answer": "The answer is 4"}
```"#;
    let service = Arc::new(
        ScriptedCompletionService::default()
            .reply_with(CompletionResult::with_tool_calls(
                "",
                vec![calculate_call("call_1", "2+2")],
            ))
            .reply(second),
    );

    let result = reasoner(&service, true)
        .process("Calculate 2+2", 0.7, true)
        .await
        .unwrap();

    assert_eq!(service.call_count(), 2);
    assert_eq!(result.final_answer(), Some("The answer is 4"));
    assert_eq!(
        result.to_value(),
        json!({
            "reasoning_steps": [{"title": "Use tool", "content": "2+2 is 4", "next_action": "final_answer"}],
            "final_answer": "The answer is 4"
        })
    );

    let requests = service.requests();
    let follow_up = &requests[1];
    assert!(follow_up.response_schema().is_none());
    assert!(follow_up.tool_declarations().is_none());

    let roles: Vec<MessageRole> = follow_up.transcript.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::User,
        ]
    );
    // The first two turns are carried over unchanged.
    assert_eq!(follow_up.transcript[..2], requests[0].transcript[..]);

    let assistant = &follow_up.transcript[2];
    assert_eq!(assistant.tool_calls, vec![calculate_call("call_1", "2+2")]);

    let tool = &follow_up.transcript[3];
    assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(tool.tool_name.as_deref(), Some("calculate"));
    let content: serde_json::Value = serde_json::from_str(&tool.content).unwrap();
    assert_eq!(content, json!({"result": 4}));

    assert_eq!(follow_up.transcript[4].content, prompts::POST_TOOL_REMINDER);
}

#[tokio::test]
async fn test_tool_round_trip_without_structure_skips_reminder() {
    let service = Arc::new(
        ScriptedCompletionService::default()
            .reply_with(CompletionResult::with_tool_calls(
                "thinking",
                vec![calculate_call("c1", "sqrt(144) + 25")],
            ))
            .reply("It is 37"),
    );

    let result = reasoner(&service, true).process("q", 0.7, false).await.unwrap();
    assert_eq!(result, ReasoningResult::content("It is 37"));

    let follow_up = &service.requests()[1];
    assert_eq!(follow_up.transcript.len(), 4);
    assert_eq!(follow_up.transcript[2].content, "thinking");
    let content: serde_json::Value = serde_json::from_str(&follow_up.transcript[3].content).unwrap();
    assert_eq!(content, json!({"result": 37.0}));
}

#[tokio::test]
async fn test_bad_tool_calls_are_skipped_in_order() {
    let calls = vec![
        ToolCall::new("a", "web_search", r#"{"q": "x"}"#),
        ToolCall::new("b", "calculate", "not json"),
        calculate_call("c", "10 // 3"),
        calculate_call("d", "__import__('os')"),
    ];
    let service = Arc::new(
        ScriptedCompletionService::default()
            .reply_with(CompletionResult::with_tool_calls("", calls))
            .reply("done"),
    );

    reasoner(&service, true).process("q", 0.7, false).await.unwrap();

    let follow_up = &service.requests()[1];
    let tool_messages: Vec<_> = follow_up
        .transcript
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("c"));
    assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("d"));
    let unsafe_result: serde_json::Value = serde_json::from_str(&tool_messages[1].content).unwrap();
    assert_eq!(unsafe_result, json!({"error": "invalid or unsafe expression"}));
}

#[tokio::test]
async fn test_tool_round_trip_happens_at_most_once() {
    let service = Arc::new(
        ScriptedCompletionService::default()
            .reply_with(CompletionResult::with_tool_calls(
                "",
                vec![calculate_call("c1", "1+1")],
            ))
            .reply_with(CompletionResult::with_tool_calls(
                "still want tools",
                vec![calculate_call("c2", "2+2")],
            ))
            .reply("never requested"),
    );

    let result = reasoner(&service, true).process("q", 0.7, false).await.unwrap();
    assert_eq!(service.call_count(), 2);
    assert_eq!(result, ReasoningResult::content("still want tools"));
}

#[tokio::test]
async fn test_malformed_structured_output_degrades() {
    let prose = "I think the answer is probably four.";
    let service = Arc::new(ScriptedCompletionService::default().reply(prose));

    let result = reasoner(&service, false).process("q", 0.7, true).await.unwrap();
    assert_eq!(result, ReasoningResult::unstructured(prose));
    assert_eq!(
        result.to_value(),
        json!({"content": prose, "structured": false})
    );
}

#[tokio::test]
async fn test_non_conforming_object_is_returned_verbatim() {
    let text = r#"{"answer": 4, "reasoning_steps": [{"title": "t", "content": "c", "next_action": "continue"}]}"#;
    let service = Arc::new(ScriptedCompletionService::default().reply(text));

    let result = reasoner(&service, false).process("q", 0.7, true).await.unwrap();
    assert_eq!(result.to_value(), serde_json::from_str::<serde_json::Value>(text).unwrap());
    assert!(result.reasoning_output().is_none());
}

#[tokio::test]
async fn test_transport_failure_surfaces_from_process() {
    let service = Arc::new(ScriptedCompletionService::default().fail("connection refused"));
    let err = reasoner(&service, true).process("q", 0.7, true).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_fallback_confirms_structured_success() {
    let service = Arc::new(ScriptedCompletionService::default().reply(STRUCTURED_ANSWER));
    let result = reasoner(&service, false).process_with_fallback("q", 0.7).await;

    let value = result.to_value();
    assert_eq!(value["structured"], json!(true));
    assert_eq!(value["final_answer"], "4");
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_fallback_keeps_already_unstructured_content() {
    let service = Arc::new(ScriptedCompletionService::default().reply("plain prose"));
    let result = reasoner(&service, false).process_with_fallback("q", 0.7).await;

    assert_eq!(result, ReasoningResult::unstructured("plain prose"));
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_fallback_after_transport_failure() {
    let service = Arc::new(
        ScriptedCompletionService::default()
            .fail("timed out")
            .reply("Step 1: add. The answer is 4."),
    );
    let result = reasoner(&service, true).process_with_fallback("q", 0.3).await;

    assert_eq!(
        result.to_value(),
        json!({"content": "Step 1: add. The answer is 4.", "structured": false})
    );
    assert_eq!(service.call_count(), 2);

    let retry = &service.requests()[1];
    assert!(retry.response_schema().is_none());
    assert!(retry.tool_declarations().is_none());
    assert_eq!(retry.temperature, 0.3);
    assert_eq!(retry.transcript[0].content, prompts::FALLBACK_SYSTEM_PROMPT);
    assert_eq!(retry.transcript[1].content, prompts::fallback_prompt("q"));
}

#[tokio::test]
async fn test_fallback_total_failure() {
    let service = Arc::new(
        ScriptedCompletionService::default()
            .fail("timed out")
            .fail("still down"),
    );
    let result = reasoner(&service, true).process_with_fallback("q", 0.7).await;

    assert!(result.is_error());
    let message = result.error_message().unwrap();
    assert!(message.starts_with("Both structured and unstructured processing failed: "));
    assert!(message.contains("still down"));
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn test_fallback_on_model_reported_error() {
    let service = Arc::new(
        ScriptedCompletionService::default()
            .reply(r#"{"error": "cannot comply"}"#)
            .reply("fallback text"),
    );
    let result = reasoner(&service, false).process_with_fallback("q", 0.7).await;

    assert_eq!(result, ReasoningResult::unstructured("fallback text"));
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn test_trailing_continue_step_is_accepted() {
    let text = r#"{"reasoning_steps": [{"title": "t", "content": "c", "next_action": "continue"}], "final_answer": "x"}"#;
    let service = Arc::new(ScriptedCompletionService::default().reply(text));
    let result = reasoner(&service, false).process("q", 0.7, true).await.unwrap();

    let output = result.reasoning_output().unwrap();
    assert_eq!(output.final_answer, "x");
    assert_eq!(
        output.last_step().map(|s| s.next_action),
        Some(crate::types::NextAction::Continue)
    );
}

#[tokio::test]
async fn test_reasoner_is_shareable_across_tasks() {
    let service = Arc::new(
        ScriptedCompletionService::default()
            .reply("a")
            .reply("b"),
    );
    let reasoner = Arc::new(reasoner(&service, false));

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let reasoner = reasoner.clone();
            tokio::spawn(async move { reasoner.process(&format!("q{i}"), 0.7, false).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.transcript.len(), 2);
    }
}
