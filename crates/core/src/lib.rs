//! # Tagflow Core
//!
//! Domain types, traits, and error definitions for the Tagflow
//! response-processing core. It defines the domain model that all other
//! crates implement against; nothing here performs I/O.
//!
//! ## Design Philosophy
//!
//! The collaborator seams (LLM transport, tools) are traits here.
//! Implementations live in their respective crates, so the streaming
//! classifier and the orchestration loop can be tested against scripted
//! doubles without touching the network.

pub mod error;
pub mod event;
pub mod llm;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{
    Error, ExtractError, LlmError, OrchestrationError, ProtocolError, Result, ToolError,
};
pub use event::StreamEvent;
pub use llm::LlmClient;
pub use tool::{ConsolidatedResults, DispatchRecord, ToolCall, ToolOutcome};
pub use turn::{Role, Turn};
