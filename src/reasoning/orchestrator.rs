use crate::client::CompletionService;
use crate::config::ReasonerConfig;
use crate::reasoning::prompts;
use crate::structured::{extract, OutputValidator, ResponseFormat};
use crate::tools;
use crate::types::{CompletionResult, GenerationRequest, Message, ReasoningResult, RequestMode};
use crate::Result;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

static REASONING_VALIDATOR: Lazy<Option<OutputValidator>> = Lazy::new(|| {
    OutputValidator::reasoning()
        .map_err(|e| warn!(error = %e, "Reasoning schema failed to compile; conformance checks disabled"))
        .ok()
});

/// Chain-of-thought orchestrator.
///
/// Holds only immutable configuration; every [`process`](Reasoner::process) call builds
/// and owns its transcript, so one instance can serve concurrent queries.
#[derive(Clone)]
pub struct Reasoner {
    pub(crate) client: Arc<dyn CompletionService>,
    use_tools: bool,
    pub(crate) max_output_tokens: u32,
}

impl Reasoner {
    pub fn new(client: Arc<dyn CompletionService>, use_tools: bool) -> Self {
        Self::with_config(client, use_tools, &ReasonerConfig::default())
    }

    pub fn with_config(client: Arc<dyn CompletionService>, use_tools: bool, config: &ReasonerConfig) -> Self {
        info!(
            tools = if use_tools { "enabled" } else { "disabled" },
            "Initialized reasoner"
        );
        Self {
            client,
            use_tools,
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn uses_tools(&self) -> bool {
        self.use_tools
    }

    /// Build the first request for a query.
    ///
    /// Mode priority: schema when tools are off and structure is wanted, tools whenever
    /// enabled, plain otherwise. With tools on, the JSON shape is requested in prose
    /// because no schema can accompany tool declarations.
    pub fn build_request(&self, query: &str, temperature: f64, structured_output: bool) -> GenerationRequest {
        let mut system = Message::system(prompts::SYSTEM_PROMPT);
        let mut user = Message::user(prompts::reasoning_prompt(query));

        let mode = if structured_output && !self.use_tools {
            ensure_json_mention(&system, &mut user);
            RequestMode::Schema(ResponseFormat::reasoning())
        } else if self.use_tools {
            if structured_output {
                system.push_str(prompts::JSON_SHAPE_INSTRUCTIONS);
            }
            RequestMode::Tools(tools::available_tools())
        } else {
            RequestMode::Plain
        };

        GenerationRequest::new(vec![system, user])
            .temperature(temperature)
            .max_output_tokens(self.max_output_tokens)
            .mode(mode)
    }

    /// Answer a query with at most one tool round-trip.
    ///
    /// Completion failures are returned as `Err`. Output that cannot be parsed when
    /// structure was requested comes back as [`ReasoningResult::Unstructured`].
    pub async fn process(&self, query: &str, temperature: f64, structured_output: bool) -> Result<ReasoningResult> {
        let request = self.build_request(query, temperature, structured_output);
        info!(query, mode = request.mode.name(), "Processing query");

        let response = self.client.complete(&request).await?;

        if response.has_tool_calls() {
            return self.tool_round_trip(request, response, structured_output).await;
        }

        Ok(self.finish(&response.text, structured_output))
    }

    async fn tool_round_trip(
        &self,
        request: GenerationRequest,
        response: CompletionResult,
        structured_output: bool,
    ) -> Result<ReasoningResult> {
        let temperature = request.temperature;
        let mut transcript = request.transcript;
        debug!(tool_calls = response.tool_calls.len(), "Handling tool calls");

        transcript.push(Message::assistant_with_tool_calls(
            response.text,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            if let Some(result) = tools::dispatch(call).filter(has_content) {
                transcript.push(Message::tool(&call.id, &call.name, result.to_string()));
            }
        }

        if structured_output {
            transcript.push(Message::user(prompts::POST_TOOL_REMINDER));
        }

        let follow_up = GenerationRequest::new(transcript)
            .temperature(temperature)
            .max_output_tokens(self.max_output_tokens);
        let final_response = self.client.complete(&follow_up).await?;

        if final_response.has_tool_calls() {
            warn!(
                tool_calls = final_response.tool_calls.len(),
                "Ignoring tool calls after the tool round-trip"
            );
        }

        Ok(self.finish(&final_response.text, structured_output))
    }

    fn finish(&self, text: &str, structured_output: bool) -> ReasoningResult {
        if !structured_output {
            return ReasoningResult::content(text);
        }

        match extract(text) {
            Ok(object) => {
                check_conformance(&object);
                info!(
                    steps = object
                        .get("reasoning_steps")
                        .and_then(serde_json::Value::as_array)
                        .map_or(0, Vec::len),
                    "Successfully processed query"
                );
                ReasoningResult::structured(object)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON response");
                ReasoningResult::unstructured(text)
            }
        }
    }
}

impl std::fmt::Debug for Reasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reasoner")
            .field("use_tools", &self.use_tools)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish_non_exhaustive()
    }
}

/// Append the JSON reminder to `user` unless either message already asks for JSON.
/// Schema mode is rejected by the service when no message mentions JSON.
pub(super) fn ensure_json_mention(system: &Message, user: &mut Message) {
    if !system.mentions_json() && !user.mentions_json() {
        user.push_str(prompts::JSON_REMINDER);
    }
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Log schema violations; the object is returned either way.
fn check_conformance(object: &Map<String, Value>) {
    let Some(validator) = REASONING_VALIDATOR.as_ref() else {
        return;
    };
    let result = validator.validate(&Value::Object(object.clone()));
    if !result.is_valid() {
        warn!(
            errors = ?result.error_messages(),
            "Structured output does not match the reasoning schema"
        );
    }
}
