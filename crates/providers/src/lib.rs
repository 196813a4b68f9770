//! # Tagflow Providers
//!
//! LLM transport implementations of the
//! [`LlmClient`](tagflow_core::LlmClient) seam. Currently one client
//! covers the field: almost every hosted or local model speaks the
//! OpenAI-compatible `/v1/chat/completions` SSE protocol.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatClient;
