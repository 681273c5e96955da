//! # cot-reasoner
//!
//! Chain-of-thought reasoning over an OpenAI-compatible chat-completions API.
//!
//! ## Overview
//!
//! A [`Reasoner`] sends a query to the model and normalizes the reply into a
//! step-by-step structured answer, or degrades to free text when the model does not
//! cooperate. The model may call a sandboxed calculator once per query.
//!
//! - **Mutually exclusive modes**: a request carries a response schema or tool
//!   declarations, never both ([`types::RequestMode`])
//! - **Single tool round-trip**: at most two completion calls per query
//! - **Degrade, don't fail**: unparseable output comes back as content, and
//!   [`Reasoner::process_with_fallback`] retries once with a plain prompt
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cot_reasoner::{HttpCompletionClient, Reasoner, ReasonerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> cot_reasoner::Result<()> {
//!     let config = ReasonerConfig::load(None)?;
//!     let client = Arc::new(HttpCompletionClient::new(&config)?);
//!     let reasoner = Reasoner::with_config(client, true, &config);
//!
//!     let result = reasoner.process_with_fallback("What is 15% of 240?", 0.7).await;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`reasoning`] | Orchestrator and fallback tiers |
//! | [`structured`] | Reasoning schema, JSON extraction, validation |
//! | [`tools`] | Calculator tool and dispatch |
//! | [`client`] | Completion service boundary |
//! | [`transport`] | HTTP client and wire format |
//! | [`service`] | Query API surface for front ends |
//! | [`types`] | Messages, requests, results |

pub mod client;
pub mod config;
pub mod logging;
pub mod reasoning;
pub mod service;
pub mod structured;
pub mod tools;
pub mod transport;
pub mod types;

pub use client::CompletionService;
pub use config::ReasonerConfig;
pub use reasoning::Reasoner;
pub use service::{QueryRequest, QueryResponse, ReasoningService};
pub use transport::HttpCompletionClient;
pub use types::{
    message::{Message, MessageRole},
    result::ReasoningResult,
    tool::ToolCall,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
