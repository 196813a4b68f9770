//! File content tool — read a file's contents with path validation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tagflow_core::error::ToolError;

use crate::spec::{ParamSpec, Tool, ToolSpec};

pub struct FileContentTool {
    spec: ToolSpec,
    /// Allowed root directories. Empty = allow all.
    allowed_roots: Vec<PathBuf>,
}

impl FileContentTool {
    pub fn new() -> Self {
        Self::with_roots(Vec::new())
    }

    pub fn with_roots(allowed_roots: Vec<PathBuf>) -> Self {
        Self {
            spec: ToolSpec::new(
                "file_content",
                "Read the contents of a file at the given path.",
                vec![ParamSpec::scalar("path")],
            ),
            allowed_roots,
        }
    }

    fn check_path(&self, path: &Path) -> Result<(), ToolError> {
        if self.allowed_roots.is_empty() {
            return Ok(());
        }
        let denied = |reason: &str| ToolError::PermissionDenied {
            tool_name: "file_content".into(),
            reason: reason.into(),
        };
        if path.components().any(|c| c.as_os_str() == "..") {
            return Err(denied("path traversal is not allowed"));
        }
        if !self.allowed_roots.iter().any(|root| path.starts_with(root)) {
            return Err(denied("path is outside the allowed roots"));
        }
        Ok(())
    }
}

impl Default for FileContentTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileContentTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(
        &self,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, ToolError> {
        let path = params
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'path' parameter".into()))?;
        self.check_path(Path::new(path))?;

        tokio::fs::read_to_string(path)
            .await
            .map_err(|err| ToolError::ExecutionFailed {
                tool_name: "file_content".into(),
                reason: format!("failed to read {path}: {err}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn params(path: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("path".into(), path.into());
        map
    }

    #[test]
    fn declared_spec() {
        let tool = FileContentTool::new();
        assert_eq!(tool.spec().name, "file_content");
        assert!(tool.spec().param("path").is_some_and(|p| p.required));
    }

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("note.txt");
        let mut f = std::fs::File::create(&file_path).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let tool = FileContentTool::new();
        let output = tool.invoke(&params(file_path.to_str().unwrap())).await.unwrap();
        assert!(output.contains("Hello, world!"));
    }

    #[tokio::test]
    async fn missing_file_is_execution_failure() {
        let tool = FileContentTool::new();
        let err = tool
            .invoke(&params("/tmp/tagflow_test_nonexistent_98765.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn missing_path_parameter() {
        let tool = FileContentTool::new();
        let err = tool.invoke(&serde_json::Map::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn traversal_blocked_when_roots_configured() {
        let tool = FileContentTool::with_roots(vec![PathBuf::from("/srv/kb")]);
        let err = tool.invoke(&params("/srv/kb/../etc/passwd")).await.unwrap_err();
        assert!(matches!(err, ToolError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn outside_roots_blocked() {
        let tool = FileContentTool::with_roots(vec![PathBuf::from("/srv/kb")]);
        let err = tool.invoke(&params("/etc/hostname")).await.unwrap_err();
        assert!(matches!(err, ToolError::PermissionDenied { .. }));
    }
}
