//! Reasoning orchestration.
//!
//! [`Reasoner::process`] picks the request mode, drives the single tool round-trip
//! and extracts the structured answer. [`Reasoner::process_with_fallback`] wraps it
//! with the degrade tiers so callers always receive a [`ReasoningResult`].
//!
//! ```rust,no_run
//! use cot_reasoner::client::ScriptedCompletionService;
//! use cot_reasoner::reasoning::Reasoner;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let service = ScriptedCompletionService::default()
//!     .reply(r#"{"reasoning_steps": [], "final_answer": "4"}"#);
//! let reasoner = Reasoner::new(Arc::new(service), false);
//! let result = reasoner.process_with_fallback("What is 2+2?", 0.2).await;
//! assert_eq!(result.final_answer(), Some("4"));
//! # }
//! ```
//!
//! [`ReasoningResult`]: crate::types::ReasoningResult

mod fallback;
mod orchestrator;
pub mod prompts;

#[cfg(test)]
mod tests;

pub use orchestrator::Reasoner;
