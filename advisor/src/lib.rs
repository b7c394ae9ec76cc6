//! Advisor - ant-keeping questions answered by a chat completion service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           AdvisoryClient                │
//! │  ask() -> answer or canned apology      │
//! │  watch::Sender<AdvisoryState>           │
//! └────────────────┬────────────────────────┘
//!                  ▼
//!         ┌─────────────────┐
//!         │   LlmBackend    │
//!         │ (OpenAI / Mock) │
//!         └─────────────────┘
//! ```

pub mod backend;
pub mod client;
pub mod config;

pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{MockBackend, OpenAiBackend};
pub use client::{AdvisoryClient, AdvisoryError, AdvisoryState};
pub use config::AdvisorConfig;
