//! LlmClient trait — the abstraction over the LLM transport.
//!
//! The orchestrator only ever sees an ordered stream of raw text
//! fragments; fragment boundaries carry no meaning and never align with
//! tag boundaries. Classification happens entirely downstream.

use crate::error::LlmError;
use crate::turn::Turn;
use async_trait::async_trait;

/// The LLM collaborator seam.
///
/// Implementations: OpenAI-compatible endpoints (tagflow-providers), test
/// doubles that replay scripted fragments.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// A human-readable name for this client (e.g., "openai_compat").
    fn name(&self) -> &str;

    /// Send the working turn list and stream back the reply as raw text
    /// fragments. The stream ends when the channel closes; a mid-stream
    /// error arrives as an `Err` item.
    async fn stream_completion(
        &self,
        turns: &[Turn],
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, LlmError>>,
        LlmError,
    >;
}
