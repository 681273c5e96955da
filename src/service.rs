//! Query API surface shared by front ends.

use crate::client::CompletionService;
use crate::config::ReasonerConfig;
use crate::reasoning::Reasoner;
use crate::types::ReasoningResult;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn default_temperature() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_true")]
    pub structured_output: bool,
    #[serde(default = "default_true")]
    pub use_tools: bool,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            temperature: default_temperature(),
            structured_output: true,
            use_tools: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub result: ReasoningResult,
}

/// Fault payload for an unrecoverable error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceError {
    #[serde(skip)]
    pub status: u16,
    pub detail: String,
}

impl ServiceError {
    pub const STATUS: u16 = 500;
}

impl From<&Error> for ServiceError {
    fn from(err: &Error) -> Self {
        Self {
            status: Self::STATUS,
            detail: format!("Error processing query: {}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn health() -> Health {
    Health {
        status: "ok",
        version: VERSION,
    }
}

/// Routes queries to a tools-enabled or tools-disabled [`Reasoner`].
#[derive(Debug, Clone)]
pub struct ReasoningService {
    with_tools: Reasoner,
    without_tools: Reasoner,
}

impl ReasoningService {
    pub fn new(client: Arc<dyn CompletionService>, config: &ReasonerConfig) -> Self {
        Self {
            with_tools: Reasoner::with_config(client.clone(), true, config),
            without_tools: Reasoner::with_config(client, false, config),
        }
    }

    pub fn reasoner(&self, use_tools: bool) -> &Reasoner {
        if use_tools {
            &self.with_tools
        } else {
            &self.without_tools
        }
    }

    pub async fn handle(&self, request: &QueryRequest) -> Result<QueryResponse> {
        info!(query = %request.query, use_tools = request.use_tools, "Received query");
        let result = self
            .reasoner(request.use_tools)
            .process(&request.query, request.temperature, request.structured_output)
            .await
            .map_err(|e| {
                error!(error = %e, "Error processing query");
                e
            })?;
        Ok(QueryResponse { result })
    }

    /// Like [`handle`](Self::handle), mapping failures to the fault payload.
    pub async fn respond(&self, request: &QueryRequest) -> std::result::Result<QueryResponse, ServiceError> {
        self.handle(request).await.map_err(|e| ServiceError::from(&e))
    }
}
