//! Error types for the Tagflow domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. Model output is
//! untrusted, so nothing in this taxonomy is allowed to escalate into a
//! panic — every failure mode resolves to a typed value.

use thiserror::Error;

/// The top-level error type for all Tagflow operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Stream protocol errors ---
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // --- Tool-call extraction errors ---
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    // --- Tool execution errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- LLM transport errors ---
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    // --- Orchestration errors ---
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Malformed or incomplete tag protocol in the model's output stream.
///
/// These are recoverable by design: the classifier flushes best-effort and
/// the caller logs the diagnostic. They never abort a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("stream ended inside an unterminated {block} block; flushed {flushed} buffered characters")]
    UnterminatedBlock { block: String, flushed: usize },

    #[error("stream ended with {len} unresolved characters in the buffer")]
    TrailingBuffer { len: usize },
}

/// Failures turning a completed tool block into a structured call.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool '{tool}' is missing required parameter '{param}'")]
    MissingParameter { tool: String, param: String },

    #[error("tool '{tool}' parameter '{param}' is not valid JSON: {reason}")]
    MalformedJson {
        tool: String,
        param: String,
        reason: String,
    },

    #[error("tool '{tool}' block has an unterminated <{param}> parameter tag")]
    UnterminatedParameter { tool: String, param: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Permission denied: {tool_name} — {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Loop-level failures. Unlike tool failures, these terminate the loop and
/// must be shown to the end user with their reason intact.
#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    #[error("iteration budget exhausted after {turns} model turns")]
    IterationBudgetExhausted { turns: u32 },

    #[error("no actionable content: the model produced neither a tool request nor an answer")]
    NoActionableContent,

    #[error("model transport failed: {0}")]
    Transport(String),
}
