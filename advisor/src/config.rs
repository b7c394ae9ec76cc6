//! Configuration for the advisory client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert ant keeper and myrmecologist. \
Provide helpful, accurate advice about ant keeping, colony management, species care, feeding, \
housing, and general ant husbandry. Focus on practical, actionable advice. Keep responses \
concise but informative. If the question is not related to ant keeping, politely redirect the \
conversation back to ant care topics.";

/// Advisory client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Output length bound
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Domain-scoping system instruction
    pub system_prompt: String,
    /// API key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout (seconds); unset means wait for the transport
    pub request_timeout_secs: Option<u64>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl AdvisorConfig {
    /// API key from the config, else from `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        let usable = |k: &String| !k.trim().is_empty();
        self.api_key
            .clone()
            .filter(usable)
            .or_else(|| fallback.filter(usable))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
