//! # Tagflow Tools
//!
//! The capability layer: the [`Tool`] trait, the explicit name-to-spec
//! [`ToolRegistry`], raw-block [`extraction`](extract) into structured
//! calls, and the built-in local tools.
//!
//! Search-style tools that need network transport plug in the same way;
//! the registry does not care where a collaborator's work happens.

pub mod extract;
pub mod file_content;
pub mod regex_search;
pub mod spec;

use std::sync::Arc;

pub use extract::{extract_from_registry, extract_tool_call};
pub use spec::{ParamKind, ParamSpec, Tool, ToolRegistry, ToolSpec};

/// A registry with the built-in local tools, unrestricted paths.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(file_content::FileContentTool::new()));
    registry.register(Arc::new(regex_search::RegexSearchTool::new()));
    registry
}
