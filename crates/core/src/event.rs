//! Classified stream events.
//!
//! `StreamEvent` is the unit the classifier emits: ordered, already
//! stripped of tag literals, and safe to hand to a render sink. Replaying
//! the payloads of a response's events reconstructs the model's output
//! minus the protocol markup.

use serde::{Deserialize, Serialize};

/// One classified, ordered unit of model output.
///
/// - `plain_text`      — text outside any tagged block
/// - `reasoning_chunk` — partial content of a reasoning block
/// - `answer_chunk`    — partial content of the final answer block
/// - `tool_open` / `tool_close`         — a tool-invocation block; the
///   close event carries the entire raw block content, withheld until
///   syntactically complete
/// - `metadata_open` / `metadata_close` — same withholding discipline for
///   metadata blocks (summary, sources, …), accumulated but never rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Untagged text, passed through for fidelity.
    PlainText { content: String },

    /// Partial reasoning content, released eagerly for responsiveness.
    ReasoningChunk { content: String },

    /// Partial answer content, released eagerly for responsiveness.
    AnswerChunk { content: String },

    /// A tool block opened.
    ToolOpen { name: String },

    /// A tool block closed; `raw` is the complete inner content.
    ToolClose { name: String, raw: String },

    /// A metadata block opened.
    MetadataOpen { name: String },

    /// A metadata block closed; `raw` is the complete inner content.
    MetadataClose { name: String, raw: String },
}

impl StreamEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlainText { .. } => "plain_text",
            Self::ReasoningChunk { .. } => "reasoning_chunk",
            Self::AnswerChunk { .. } => "answer_chunk",
            Self::ToolOpen { .. } => "tool_open",
            Self::ToolClose { .. } => "tool_close",
            Self::MetadataOpen { .. } => "metadata_open",
            Self::MetadataClose { .. } => "metadata_close",
        }
    }

    /// The textual payload carried by this event, if any.
    ///
    /// Open events carry no payload; close events carry the raw block body.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::PlainText { content }
            | Self::ReasoningChunk { content }
            | Self::AnswerChunk { content } => Some(content),
            Self::ToolClose { raw, .. } | Self::MetadataClose { raw, .. } => Some(raw),
            Self::ToolOpen { .. } | Self::MetadataOpen { .. } => None,
        }
    }

    /// Whether this event is user-visible prose (as opposed to protocol
    /// structure the render sink may hide).
    pub fn is_prose(&self) -> bool {
        matches!(
            self,
            Self::PlainText { .. } | Self::ReasoningChunk { .. } | Self::AnswerChunk { .. }
        )
    }
}
