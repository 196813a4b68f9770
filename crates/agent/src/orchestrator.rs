//! The tool-orchestration loop.
//!
//! One run serves one user request: send the working turn list to the
//! model, classify its streamed reply, and either finish on an answer,
//! dispatch the requested tools and iterate, or nudge the model once
//! when a turn contains neither. Every way out of the loop is a typed
//! [`Termination`] the caller can show to the end user.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tagflow_core::error::{LlmError, OrchestrationError, ProtocolError, ToolError};
use tagflow_core::event::StreamEvent;
use tagflow_core::llm::LlmClient;
use tagflow_core::tool::{ConsolidatedResults, DispatchRecord, ToolCall, ToolOutcome};
use tagflow_core::turn::Turn;
use tagflow_stream::{ClassifierConfig, ResponsePipeline, TagVocabulary};
use tagflow_tools::{extract_from_registry, ToolRegistry};

use crate::consolidate;

/// Appended once, after the first turn with neither a tool request nor
/// an answer. A second such turn fails the run.
const COMPLIANCE_NUDGE: &str = "Your previous reply contained neither a tool request nor an \
     answer. Reply with a <tool_...> block to request a tool, or a \
     <present_answer> block to answer the user.";

/// Orchestrator tuning.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model turns allowed per run; the circuit breaker against
    /// unbounded tool-request loops.
    pub max_iterations: u32,
    /// Per-call tool dispatch timeout.
    pub tool_timeout: Duration,
    pub classifier: ClassifierConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 4,
            tool_timeout: Duration::from_secs(30),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// How a run ended. Failures carry their reason intact — the caller
/// renders them, never swallows them.
#[derive(Debug)]
pub enum Termination {
    /// The model produced an answer block.
    Answered { answer: String },
    /// An orchestration-level failure.
    Failed { error: OrchestrationError },
    /// The external cancellation signal fired.
    Cancelled,
}

/// The full account of one run.
#[derive(Debug)]
pub struct RunReport {
    pub termination: Termination,
    /// The working turn list as it stood at termination, including the
    /// synthetic tool-result turns.
    pub turns: Vec<Turn>,
    /// Model turns consumed (compliance retries count).
    pub model_turns: u32,
    /// Protocol diagnostics collected across all model turns.
    pub diagnostics: Vec<ProtocolError>,
}

enum TurnResult {
    Completed {
        raw: String,
        events: Vec<StreamEvent>,
        diagnostics: Vec<ProtocolError>,
    },
    Cancelled,
    Transport(String),
}

/// Drives one request through model turns and tool dispatches.
/// Per-request: the pipeline state inside never outlives a run.
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            registry,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the loop to termination. Classified events are forwarded to
    /// `sink` as they resolve; the report carries the final state.
    pub async fn run(
        &self,
        mut turns: Vec<Turn>,
        sink: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> RunReport {
        let mut model_turns: u32 = 0;
        let mut diagnostics = Vec::new();
        let mut nudged = false;

        let termination = loop {
            if cancel.is_cancelled() {
                break Termination::Cancelled;
            }
            if model_turns >= self.config.max_iterations {
                warn!(turns = model_turns, "iteration budget exhausted");
                break Termination::Failed {
                    error: OrchestrationError::IterationBudgetExhausted { turns: model_turns },
                };
            }
            model_turns += 1;
            debug!(iteration = model_turns, "model turn");

            let (raw, events) = match self.model_turn(&turns, &sink, &cancel).await {
                TurnResult::Cancelled => break Termination::Cancelled,
                TurnResult::Transport(reason) => {
                    break Termination::Failed {
                        error: OrchestrationError::Transport(reason),
                    }
                }
                TurnResult::Completed {
                    raw,
                    events,
                    diagnostics: turn_diagnostics,
                } => {
                    diagnostics.extend(turn_diagnostics);
                    (raw, events)
                }
            };
            turns.push(Turn::assistant(raw));

            // An answer ends the run even when the same turn also
            // requested tools.
            if events
                .iter()
                .any(|e| matches!(e, StreamEvent::AnswerChunk { .. }))
            {
                let answer: String = events
                    .iter()
                    .filter_map(|e| match e {
                        StreamEvent::AnswerChunk { content } => Some(content.as_str()),
                        _ => None,
                    })
                    .collect();
                break Termination::Answered { answer };
            }

            let blocks: Vec<(String, String)> = events
                .into_iter()
                .filter_map(|e| match e {
                    StreamEvent::ToolClose { name, raw } => Some((name, raw)),
                    _ => None,
                })
                .collect();

            if !blocks.is_empty() {
                let Some(results) = self.dispatch_batch(blocks, &cancel).await else {
                    break Termination::Cancelled;
                };
                info!(
                    executed = results.executed(),
                    succeeded = results.succeeded(),
                    failed = results.failed(),
                    "tool batch consolidated"
                );
                turns.push(consolidate::tool_results_turn(&results));
                continue;
            }

            // Neither a tool request nor an answer.
            if nudged {
                break Termination::Failed {
                    error: OrchestrationError::NoActionableContent,
                };
            }
            warn!("empty model turn, prompting for compliance");
            nudged = true;
            turns.push(Turn::system(COMPLIANCE_NUDGE));
        };

        RunReport {
            termination,
            turns,
            model_turns,
            diagnostics,
        }
    }

    /// Stream one model reply through a fresh pipeline, forwarding
    /// events to the sink as they resolve.
    async fn model_turn(
        &self,
        turns: &[Turn],
        sink: &mpsc::Sender<StreamEvent>,
        cancel: &CancellationToken,
    ) -> TurnResult {
        let mut rx = match self.llm.stream_completion(turns).await {
            Ok(rx) => rx,
            Err(err) => return TurnResult::Transport(err.to_string()),
        };

        let vocabulary = TagVocabulary::standard().with_tools(self.registry.names());
        let mut pipeline = ResponsePipeline::new(vocabulary, &self.config.classifier);
        let mut raw = String::new();
        let mut collected = Vec::new();

        loop {
            let item = tokio::select! {
                _ = cancel.cancelled() => return TurnResult::Cancelled,
                item = rx.recv() => item,
            };
            match item {
                Some(Ok(fragment)) => {
                    raw.push_str(&fragment);
                    for event in pipeline.feed(&fragment) {
                        // A dropped sink stops rendering, not the run.
                        let _ = sink.send(event.clone()).await;
                        collected.push(event);
                    }
                }
                Some(Err(err)) => {
                    if matches!(err, LlmError::StreamInterrupted(_)) {
                        warn!(error = %err, "model stream interrupted");
                    }
                    return TurnResult::Transport(err.to_string());
                }
                None => break,
            }
        }

        let (trailing, diagnostics) = pipeline.finish();
        for event in trailing {
            let _ = sink.send(event.clone()).await;
            collected.push(event);
        }
        TurnResult::Completed {
            raw,
            events: collected,
            diagnostics,
        }
    }

    /// Fan-out / fan-in over one turn's tool blocks. Calls run
    /// concurrently, each under its own timeout; results come back in
    /// issuance order. Returns `None` when cancelled — partial results
    /// are never forwarded.
    async fn dispatch_batch(
        &self,
        blocks: Vec<(String, String)>,
        cancel: &CancellationToken,
    ) -> Option<ConsolidatedResults> {
        let mut dispatches: Vec<BoxFuture<'static, DispatchRecord>> = Vec::new();
        for (name, raw) in blocks {
            match extract_from_registry(&self.registry, &name, &raw) {
                Err(err) => {
                    // A bad call is reported back to the model; its
                    // siblings still run.
                    warn!(tool = %name, error = %err, "tool-call extraction failed");
                    dispatches.push(Box::pin(future::ready(DispatchRecord {
                        call: ToolCall::new(&name),
                        outcome: ToolOutcome::Failure {
                            reason: err.to_string(),
                        },
                    })));
                }
                Ok(call) => {
                    let registry = Arc::clone(&self.registry);
                    let timeout = self.config.tool_timeout;
                    dispatches.push(Box::pin(async move {
                        let outcome =
                            match tokio::time::timeout(timeout, registry.dispatch(&call)).await {
                                Ok(outcome) => outcome,
                                Err(_) => ToolOutcome::Failure {
                                    reason: ToolError::Timeout {
                                        tool_name: call.name.clone(),
                                        timeout_secs: timeout.as_secs(),
                                    }
                                    .to_string(),
                                },
                            };
                        DispatchRecord { call, outcome }
                    }));
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => None,
            records = future::join_all(dispatches) => Some(ConsolidatedResults::new(records)),
        }
    }
}
