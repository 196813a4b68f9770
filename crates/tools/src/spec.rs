//! Tool trait, parameter schemas, and the capability registry.
//!
//! Routing is an explicit table: a tool name maps to a [`ToolSpec`]
//! describing its parameters and to the collaborator that executes it.
//! There is no reflective or dynamic discovery — a tool the registry
//! does not know is an extraction failure, reported back to the model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tagflow_core::error::ToolError;
use tagflow_core::tool::{ToolCall, ToolOutcome};

/// How a parameter's raw tag content is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Taken verbatim, trimmed.
    Scalar,
    /// Parsed as JSON (lists, objects).
    Json,
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub fn scalar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Scalar,
            required: true,
        }
    }

    pub fn json(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Json,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// A tool's declared capability: its name and parameter schema.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A pluggable tool collaborator. Implementations must be cancel-safe:
/// the orchestrator may drop the invoke future on timeout or shutdown.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    async fn invoke(
        &self,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, ToolError>;
}

/// Name-to-collaborator table. Registration order is preserved so the
/// tag vocabulary and the system prompt list tools deterministically.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.spec().name.clone();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|t| t.spec())
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Execute one call. Tool errors become failure outcomes here — a
    /// bad call must never take down the batch it was dispatched with.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let Some(tool) = self.get(&call.name) else {
            return ToolOutcome::Failure {
                reason: ToolError::NotFound(call.name.clone()).to_string(),
            };
        };
        match tool.invoke(&call.params).await {
            Ok(payload) => ToolOutcome::Success { payload },
            Err(err) => {
                tracing::warn!(tool = %call.name, error = %err, "tool invocation failed");
                ToolOutcome::Failure {
                    reason: err.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}
