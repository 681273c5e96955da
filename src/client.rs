//! The completion service boundary.
//!
//! The reasoning engine talks to the model only through [`CompletionService`].
//! [`HttpCompletionClient`](crate::transport::HttpCompletionClient) is the production
//! implementation; [`ScriptedCompletionService`] replays canned replies and records
//! every request it receives.

use crate::transport::TransportError;
use crate::types::{CompletionResult, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A remote model that turns a transcript into a completion.
///
/// Any `Err` is a transport failure: the call could not complete (authentication,
/// network, timeout, malformed request). Implementations must not retry.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &GenerationRequest) -> Result<CompletionResult>;
}

/// One canned outcome of a scripted completion call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Completion(CompletionResult),
    Failure(String),
}

/// In-memory service for tests and offline runs.
///
/// Replies are consumed in order; once the script is exhausted every call fails.
#[derive(Debug, Default)]
pub struct ScriptedCompletionService {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedCompletionService {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a plain text reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(ScriptedReply::Completion(CompletionResult::text(text)))
    }

    /// Queue a full completion (text and tool calls).
    pub fn reply_with(self, completion: CompletionResult) -> Self {
        self.push(ScriptedReply::Completion(completion))
    }

    /// Queue a transport failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(ScriptedReply::Failure(message.into()))
    }

    fn push(self, reply: ScriptedReply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletionService {
    async fn complete(&self, request: &GenerationRequest) -> Result<CompletionResult> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let next = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(ScriptedReply::Completion(result)) => Ok(result),
            Some(ScriptedReply::Failure(message)) => {
                Err(Error::Transport(TransportError::Other(message)))
            }
            None => Err(Error::Transport(TransportError::Other(
                "no scripted completion left".into(),
            ))),
        }
    }
}
