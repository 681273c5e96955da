use crate::client::CompletionService;
use crate::config::ReasonerConfig;
use crate::transport::wire;
use crate::types::{CompletionResult, GenerationRequest};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use keyring::Entry;
use std::env;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

/// Keyring service name under which API keys are stored.
pub const KEYRING_SERVICE: &str = "cot-reasoner";

/// OpenAI-compatible chat-completions client.
///
/// One `POST {base_url}/chat/completions` per [`complete`](CompletionService::complete)
/// call, no retries. Timeouts are enforced here.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpCompletionClient {
    /// Build a client, resolving the API key from the keyring, then the environment.
    pub fn new(config: &ReasonerConfig) -> Result<Self> {
        let api_key = Self::get_api_key(&config.provider_id, &config.api_key_env).ok_or_else(|| {
            Error::configuration_with_context(
                format!("{} environment variable is not set", config.api_key_env),
                ErrorContext::new()
                    .with_field_path("api_key_env")
                    .with_details(format!(
                        "no keyring entry for service '{}' user '{}'",
                        KEYRING_SERVICE, config.provider_id
                    ))
                    .with_source("http_transport"),
            )
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &ReasonerConfig, api_key: impl Into<String>) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| Error::Transport(crate::transport::TransportError::Other(e.to_string())))?;

        debug!(model = %config.model, base_url = %config.base_url, "Initialized completion client");

        Ok(Self {
            client,
            endpoint: config.completions_url(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    fn get_api_key(provider_id: &str, env_var: &str) -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, provider_id) {
            if let Ok(key) = entry.get_password() {
                if !key.trim().is_empty() {
                    return Some(key);
                }
            }
        }

        // 2. Try Environment Variable
        env::var(env_var).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<CompletionResult> {
        let body = wire::encode_request(request, &self.model);
        let request_id = Uuid::new_v4().to_string();
        debug!(
            request_id = %request_id,
            messages = request.transcript.len(),
            mode = request.mode.name(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("x-request-id", &request_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(request_id = %request_id, error = %e, "Completion request failed");
                Error::Transport(crate::transport::TransportError::Http(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = wire::error_message(&text);
            error!(request_id = %request_id, status = status.as_u16(), %message, "Completion service returned an error");
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Transport(crate::transport::TransportError::Http(e)))?;

        let result = wire::decode_response(&json)?;
        debug!(
            request_id = %request_id,
            text = %result.text.chars().take(100).collect::<String>(),
            tool_calls = result.tool_calls.len(),
            "Received completion"
        );
        Ok(result)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ReasonerConfig {
            base_url: "::not a url".into(),
            ..Default::default()
        };
        let err = HttpCompletionClient::with_api_key(&config, "k").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_endpoint_is_derived_from_base_url() {
        let config = ReasonerConfig {
            base_url: "http://127.0.0.1:1234/v1/".into(),
            ..Default::default()
        };
        let client = HttpCompletionClient::with_api_key(&config, "k").unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1234/v1/chat/completions");
        assert_eq!(client.model(), "llama-3.3-70b-versatile");
        assert!(!format!("{:?}", client).contains("\"k\""));
    }
}
