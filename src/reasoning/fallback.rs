//! Tiered fallback around [`Reasoner::process`].

use super::prompts;
use super::Reasoner;
use crate::types::{GenerationRequest, Message, ReasoningResult};
use crate::Result;
use tracing::{error, warn};

impl Reasoner {
    /// Best-effort answer; never returns `Err`.
    ///
    /// 1. Structured attempt. An `error` key skips straight to the plain retry.
    /// 2. Unparseable structured output is returned as-is, without another call.
    /// 3. Any failure gets one plain step-by-step call, returned as unstructured
    ///    content. If that also fails the result is [`ReasoningResult::Failed`].
    ///
    /// A successful structured result is confirmed (`"structured": true`).
    pub async fn process_with_fallback(&self, query: &str, temperature: f64) -> ReasoningResult {
        let failure = match self.process(query, temperature, true).await {
            Ok(result) if result.is_error() => {
                let message = result.error_message().unwrap_or_default();
                warn!(error = %message, "Structured output failed. Falling back to unstructured output.");
                message
            }
            Ok(result) if result.is_unstructured() => {
                warn!("Failed to get structured output. Using the unstructured response.");
                return result;
            }
            Ok(result) => return result.confirm(),
            Err(e) => {
                error!(error = %e, "Error in structured processing. Falling back to unstructured output.");
                e.to_string()
            }
        };

        match self.generate_unstructured_reasoning(query, temperature).await {
            Ok(content) => ReasoningResult::unstructured(content),
            Err(e) => {
                error!(error = %e, first_error = %failure, "Fallback also failed");
                ReasoningResult::failed(format!(
                    "Both structured and unstructured processing failed: {}",
                    e
                ))
            }
        }
    }

    /// One plain completion with a step-by-step prompt; no schema, no tools.
    pub async fn generate_unstructured_reasoning(&self, query: &str, temperature: f64) -> Result<String> {
        let request = GenerationRequest::new(vec![
            Message::system(prompts::FALLBACK_SYSTEM_PROMPT),
            Message::user(prompts::fallback_prompt(query)),
        ])
        .temperature(temperature)
        .max_output_tokens(self.max_output_tokens);

        let response = self.client.complete(&request).await?;
        Ok(response.text)
    }
}
