//! # Tagflow Agent
//!
//! The tool-orchestration loop: model turns in, tool dispatches out,
//! until an answer block or a typed failure ends the run.
//!
//! The [`Orchestrator`] owns nothing long-lived — session history is an
//! external collaborator, and each `run()` works on its own turn list,
//! classifier pipeline, and cancellation token.

pub mod consolidate;
pub mod orchestrator;

pub use consolidate::{format_results, tool_results_turn};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunReport, Termination};
