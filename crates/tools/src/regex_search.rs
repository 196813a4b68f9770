//! Regex search tool — match lines of a file against a pattern.

use async_trait::async_trait;
use regex::Regex;
use tagflow_core::error::ToolError;

use crate::spec::{ParamSpec, Tool, ToolSpec};

/// Matches beyond this count are dropped; the footer says so.
const MAX_MATCHES: usize = 100;

pub struct RegexSearchTool {
    spec: ToolSpec,
}

impl RegexSearchTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "regex_search",
                "Search a file for lines matching a regular expression.",
                vec![ParamSpec::scalar("pattern"), ParamSpec::scalar("path")],
            ),
        }
    }
}

impl Default for RegexSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RegexSearchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(
        &self,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, ToolError> {
        let pattern = params
            .get("pattern")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'pattern' parameter".into()))?;
        let path = params
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'path' parameter".into()))?;

        let regex = Regex::new(pattern)
            .map_err(|err| ToolError::InvalidArguments(format!("invalid pattern: {err}")))?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| ToolError::ExecutionFailed {
                tool_name: "regex_search".into(),
                reason: format!("failed to read {path}: {err}"),
            })?;

        let mut matches = Vec::new();
        let mut truncated = false;
        for (idx, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                if matches.len() == MAX_MATCHES {
                    truncated = true;
                    break;
                }
                matches.push(format!("{}:{line}", idx + 1));
            }
        }

        if matches.is_empty() {
            return Ok(format!("No matches for /{pattern}/ in {path}"));
        }
        let mut output = matches.join("\n");
        if truncated {
            output.push_str(&format!("\n… truncated at {MAX_MATCHES} matches"));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn params(pattern: &str, path: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("pattern".into(), pattern.into());
        map.insert("path".into(), path.into());
        map
    }

    fn fixture(lines: &[&str]) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haystack.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        let path = path.to_str().unwrap().to_string();
        (dir, path)
    }

    #[tokio::test]
    async fn matching_lines_with_numbers() {
        let (_dir, path) = fixture(&["alpha", "beta one", "gamma", "beta two"]);
        let tool = RegexSearchTool::new();
        let output = tool.invoke(&params("^beta", &path)).await.unwrap();
        assert_eq!(output, "2:beta one\n4:beta two");
    }

    #[tokio::test]
    async fn no_matches_reported_plainly() {
        let (_dir, path) = fixture(&["alpha"]);
        let tool = RegexSearchTool::new();
        let output = tool.invoke(&params("zeta", &path)).await.unwrap();
        assert!(output.contains("No matches"));
    }

    #[tokio::test]
    async fn invalid_pattern_is_invalid_arguments() {
        let (_dir, path) = fixture(&["alpha"]);
        let tool = RegexSearchTool::new();
        let err = tool.invoke(&params("(unclosed", &path)).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn match_cap_is_reported() {
        let lines: Vec<String> = (0..150).map(|i| format!("hit {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let (_dir, path) = fixture(&refs);
        let tool = RegexSearchTool::new();
        let output = tool.invoke(&params("hit", &path)).await.unwrap();
        assert!(output.contains("truncated at 100"));
        assert_eq!(output.matches('\n').count(), 100);
    }
}
