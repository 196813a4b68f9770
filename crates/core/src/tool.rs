//! Tool-call and tool-outcome value types.
//!
//! A `ToolCall` is the structured request extracted from one completed
//! tool block. Outcomes are deliberately binary — success payload or
//! failure reason — because both are reported back to the model verbatim
//! and it decides what to do next.

use serde::{Deserialize, Serialize};

/// A structured tool request extracted from a completed tool block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,

    /// Parameter mapping (insertion order carries no meaning)
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Convenience accessor for a scalar string parameter.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}

/// The outcome of dispatching one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The tool ran and produced a payload.
    Success { payload: String },
    /// The tool could not run or failed; the reason is preserved verbatim.
    Failure { reason: String },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// One (call, outcome) pair in issuance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub call: ToolCall,
    pub outcome: ToolOutcome,
}

/// Aggregated outcomes of one batch of tool calls from a single model
/// turn. Records keep issuance order; counts are derived, never stored
/// independently of the records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidatedResults {
    pub records: Vec<DispatchRecord>,
}

impl ConsolidatedResults {
    pub fn new(records: Vec<DispatchRecord>) -> Self {
        Self { records }
    }

    /// Total calls dispatched.
    pub fn executed(&self) -> usize {
        self.records.len()
    }

    /// Calls that produced a payload.
    pub fn succeeded(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    /// Calls that failed for any reason (extraction, timeout, execution).
    pub fn failed(&self) -> usize {
        self.executed() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_with(name: &str, key: &str, value: &str) -> ToolCall {
        let mut call = ToolCall::new(name);
        call.params.insert(key.into(), value.into());
        call
    }

    #[test]
    fn param_str_accessor() {
        let call = call_with("search", "query", "foo");
        assert_eq!(call.param_str("query"), Some("foo"));
        assert_eq!(call.param_str("missing"), None);
    }

    #[test]
    fn consolidated_counts() {
        let results = ConsolidatedResults::new(vec![
            DispatchRecord {
                call: call_with("search", "query", "a"),
                outcome: ToolOutcome::Success { payload: "hit".into() },
            },
            DispatchRecord {
                call: call_with("regex_search", "pattern", "b"),
                outcome: ToolOutcome::Success { payload: "hit".into() },
            },
            DispatchRecord {
                call: call_with("web_search", "query", "c"),
                outcome: ToolOutcome::Failure { reason: "timeout".into() },
            },
        ]);
        assert_eq!(results.executed(), 3);
        assert_eq!(results.succeeded(), 2);
        assert_eq!(results.failed(), 1);
    }

    #[test]
    fn outcome_wire_format() {
        let ok = ToolOutcome::Success { payload: "x".into() };
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains(r#""status":"success""#));

        let err = ToolOutcome::Failure { reason: "why".into() };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""status":"failure""#));
        assert!(json.contains("why"));
    }

    #[test]
    fn empty_batch_counts() {
        let results = ConsolidatedResults::default();
        assert_eq!(results.executed(), 0);
        assert_eq!(results.failed(), 0);
    }
}
