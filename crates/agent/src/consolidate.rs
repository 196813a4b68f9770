//! Consolidation — one batch of tool outcomes becomes one synthetic turn.
//!
//! The formatted turn enumerates every call in issuance order with its
//! name, success or failure, and payload or reason. Failures are shown to
//! the model verbatim so it can self-correct on the next iteration.

use tagflow_core::tool::{ConsolidatedResults, ToolOutcome};
use tagflow_core::turn::Turn;

/// Render a batch of outcomes as the text of the next tool-results turn.
pub fn format_results(results: &ConsolidatedResults) -> String {
    let mut out = format!(
        "Tool results ({} executed, {} succeeded, {} failed):",
        results.executed(),
        results.succeeded(),
        results.failed()
    );
    for (idx, record) in results.records.iter().enumerate() {
        match &record.outcome {
            ToolOutcome::Success { payload } => {
                out.push_str(&format!("\n{}. {}: success\n{payload}", idx + 1, record.call.name));
            }
            ToolOutcome::Failure { reason } => {
                out.push_str(&format!("\n{}. {}: failure\n{reason}", idx + 1, record.call.name));
            }
        }
    }
    out
}

/// The synthetic tool-role turn appended to the working list.
pub fn tool_results_turn(results: &ConsolidatedResults) -> Turn {
    Turn::tool_results(format_results(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_core::tool::{DispatchRecord, ToolCall};

    fn record(name: &str, outcome: ToolOutcome) -> DispatchRecord {
        DispatchRecord {
            call: ToolCall::new(name),
            outcome,
        }
    }

    #[test]
    fn counts_and_order_in_header() {
        let results = ConsolidatedResults::new(vec![
            record("search", ToolOutcome::Success { payload: "three hits".into() }),
            record("regex_search", ToolOutcome::Failure { reason: "timed out".into() }),
            record("file_content", ToolOutcome::Success { payload: "body".into() }),
        ]);
        let text = format_results(&results);
        assert!(text.starts_with("Tool results (3 executed, 2 succeeded, 1 failed):"));
        let search_pos = text.find("1. search: success").unwrap();
        let regex_pos = text.find("2. regex_search: failure").unwrap();
        let file_pos = text.find("3. file_content: success").unwrap();
        assert!(search_pos < regex_pos && regex_pos < file_pos);
        assert!(text.contains("timed out"));
    }

    #[test]
    fn turn_has_tool_role() {
        let results = ConsolidatedResults::new(vec![record(
            "search",
            ToolOutcome::Success { payload: "ok".into() },
        )]);
        let turn = tool_results_turn(&results);
        assert_eq!(turn.role, tagflow_core::turn::Role::Tool);
        assert!(turn.content.contains("1 executed"));
    }
}
