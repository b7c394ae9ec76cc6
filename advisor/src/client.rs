//! AdvisoryClient - turns one question into one answer.
//!
//! `ask` never fails: backend errors become a canned apology plus a
//! `Failed` state on the watch channel.
//!
//! The client does not serialize calls. Overlapping `ask`s each publish
//! their own `Loading` and final state on the shared channel, so the
//! channel reflects whichever call finished last.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::traits::{CompletionRequest, LlmBackend, LlmError};
use crate::backend::OpenAiBackend;
use crate::config::AdvisorConfig;

#[cfg(feature = "typescript")]
use ts_rs::TS;

pub const STATUS_REPLY: &str =
    "Sorry, I'm having trouble connecting to the AI service right now. Please try again later.";
pub const SHAPE_REPLY: &str = "Sorry, I received an unexpected response. Please try again.";
pub const TRANSPORT_REPLY: &str = "Sorry, I encountered an error while processing your request. \
Please check your internet connection and try again.";

/// Why an advisory request produced no answer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvisoryError {
    /// The service answered with a non-success status
    #[error("Service returned HTTP {0}")]
    Service(u16),

    /// The service answered, but not with a usable completion
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No response was received
    #[error("Request failed: {0}")]
    Transport(String),
}

impl AdvisoryError {
    /// Answer shown to the user in place of a completion.
    pub fn canned_reply(&self) -> &'static str {
        match self {
            AdvisoryError::Service(_) => STATUS_REPLY,
            AdvisoryError::UnexpectedResponse(_) => SHAPE_REPLY,
            AdvisoryError::Transport(_) => TRANSPORT_REPLY,
        }
    }
}

impl From<LlmError> for AdvisoryError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Status { status, .. } => AdvisoryError::Service(status),
            LlmError::UnexpectedShape(detail) => AdvisoryError::UnexpectedResponse(detail),
            LlmError::Network(detail) | LlmError::Client(detail) => {
                AdvisoryError::Transport(detail)
            }
        }
    }
}

/// Published state of the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum AdvisoryState {
    #[default]
    Idle,
    Loading,
    /// Trimmed answer of the last completed call
    Answered(String),
    /// Error description of the last completed call
    Failed(String),
}

impl AdvisoryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AdvisoryState::Loading)
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            AdvisoryState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Client for ant-keeping questions over an [`LlmBackend`].
pub struct AdvisoryClient<B> {
    backend: B,
    system_prompt: String,
    max_tokens: u32,
    temperature: f64,
    state: watch::Sender<AdvisoryState>,
}

impl AdvisoryClient<OpenAiBackend> {
    /// Build a client over an OpenAI-compatible backend.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, LlmError> {
        let backend = OpenAiBackend::with_timeout(
            config.base_url.clone(),
            config.model.clone(),
            config.resolve_api_key(),
            config.request_timeout(),
        )?;
        Ok(Self::new(backend).with_config(config))
    }
}

impl<B: LlmBackend> AdvisoryClient<B> {
    /// Create a client with the default prompt and generation parameters.
    pub fn new(backend: B) -> Self {
        let defaults = AdvisorConfig::default();
        let (state, _) = watch::channel(AdvisoryState::Idle);
        Self {
            backend,
            system_prompt: defaults.system_prompt,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            state,
        }
    }

    /// Take prompt and generation parameters from `config`.
    pub fn with_config(mut self, config: &AdvisorConfig) -> Self {
        self.system_prompt = config.system_prompt.clone();
        self.max_tokens = config.max_tokens;
        self.temperature = config.temperature;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Watch the client's state.
    pub fn subscribe(&self) -> watch::Receiver<AdvisoryState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AdvisoryState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error().map(str::to_string)
    }

    fn request(&self, question: &str) -> CompletionRequest {
        CompletionRequest::user(question)
            .with_system(self.system_prompt.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }

    /// Ask one question. Returns the trimmed answer, or a canned apology
    /// when the backend fails.
    pub async fn ask(&self, question: &str) -> String {
        self.state.send_replace(AdvisoryState::Loading);
        info!(backend = %self.backend.id(), question_len = question.len(), "Advisory request started");

        match self.backend.complete(self.request(question)).await {
            Ok(response) => {
                let answer = response.content.trim().to_string();
                info!(
                    answer_len = answer.len(),
                    tokens = ?response.usage.map(|u| u.total()),
                    "Advisory request answered"
                );
                self.state.send_replace(AdvisoryState::Answered(answer.clone()));
                answer
            }
            Err(e) => {
                let error = AdvisoryError::from(e);
                warn!(error = %error, "Advisory request failed");
                self.state.send_replace(AdvisoryState::Failed(error.to_string()));
                error.canned_reply().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let client = AdvisoryClient::new(MockBackend::default().with_response("\n  Keep it dark.  \n"));

        assert_eq!(client.ask("Where?").await, "Keep it dark.");
        assert_eq!(client.state(), AdvisoryState::Answered("Keep it dark.".into()));
        assert!(!client.is_loading());
        assert!(client.last_error().is_none());
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_parameters() {
        let client = AdvisoryClient::new(MockBackend::default());
        client.ask("How often to feed?").await;

        let expected = CompletionRequest::user("How often to feed?")
            .with_system(crate::config::DEFAULT_SYSTEM_PROMPT)
            .with_max_tokens(500)
            .with_temperature(0.7);
        assert_eq!(client.backend().last_request(), Some(expected));
    }

    #[tokio::test]
    async fn test_failures_map_to_canned_replies() {
        let cases = [
            (LlmError::Network("offline".into()), TRANSPORT_REPLY),
            (LlmError::Status { status: 500, body: String::new() }, STATUS_REPLY),
            (LlmError::UnexpectedShape("no choices".into()), SHAPE_REPLY),
        ];
        for (error, reply) in cases {
            let client = AdvisoryClient::new(MockBackend::default().with_error(error));

            assert_eq!(client.ask("x").await, reply);
            assert!(!client.is_loading());
            assert!(!client.last_error().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_new_call_clears_previous_error() {
        let failing = AdvisoryClient::new(
            MockBackend::default().with_error(LlmError::Network("offline".into())),
        );
        failing.ask("x").await;
        assert!(failing.last_error().is_some());

        let mut rx = failing.subscribe();
        rx.mark_unchanged();
        failing.ask("y").await;
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_loading_is_published_during_call() {
        let client = Arc::new(AdvisoryClient::new(
            MockBackend::default().with_delay(Duration::from_millis(50)),
        ));
        let mut rx = client.subscribe();

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.ask("q").await }
        });

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading());
        assert!(client.is_loading());

        assert_eq!(task.await.unwrap(), "Mock response");
        assert!(!client.is_loading());
    }
}
