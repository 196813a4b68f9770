//! The streaming classifier — a finite-state machine over raw fragments.
//!
//! `feed()` appends a fragment to the buffer and emits zero or more
//! ordered [`StreamEvent`]s. It is pure and synchronous: no I/O, no
//! blocking, one instance per response stream.
//!
//! The central asymmetry: reasoning and answer content is released
//! eagerly (withholding only a close-tag safety margin) because a human
//! is watching it render; tool and metadata payloads are withheld in
//! full until their close tag arrives because they must be parsed as
//! structured data and a partial payload is meaningless markup.

use tagflow_core::error::ProtocolError;
use tagflow_core::event::StreamEvent;

use crate::normalizer::NewlineNormalizer;
use crate::vocabulary::{BlockKind, TagScan, TagVocabulary};

/// Classifier tuning.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Extra bytes beyond the longest open literal that an unresolved
    /// `<` candidate may occupy before being force-flushed as plain text.
    pub lookahead_margin: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { lookahead_margin: 16 }
    }
}

/// The block the classifier is currently inside.
#[derive(Debug, Clone)]
struct ActiveBlock {
    kind: BlockKind,
    close: String,
    label: String,
}

/// Fragment-to-event state machine. States: neutral, in-reasoning,
/// in-answer, in-tool, in-metadata — exactly one active, never nested.
#[derive(Debug)]
pub struct StreamingClassifier {
    vocabulary: TagVocabulary,
    buffer: String,
    active: Option<ActiveBlock>,
    lookahead: usize,
}

impl StreamingClassifier {
    /// The effective lookahead threshold is always at least the longest
    /// open literal, whatever the configured margin.
    pub fn new(vocabulary: TagVocabulary, config: &ClassifierConfig) -> Self {
        let lookahead = vocabulary.longest_open_len() + config.lookahead_margin;
        Self {
            vocabulary,
            buffer: String::new(),
            active: None,
            lookahead,
        }
    }

    /// Whether the machine is in the neutral state with an empty buffer —
    /// the only legal configuration at end of stream.
    pub fn is_quiescent(&self) -> bool {
        self.active.is_none() && self.buffer.is_empty()
    }

    /// Feed one fragment; returns the events it resolves, in order.
    pub fn feed(&mut self, fragment: &str) -> Vec<StreamEvent> {
        self.buffer.push_str(fragment);
        let mut events = Vec::new();
        loop {
            let progressed = match self.active.clone() {
                None => self.dispatch_neutral(&mut events),
                Some(block) => match block.kind {
                    BlockKind::Reasoning | BlockKind::Answer => {
                        self.dispatch_prose_block(&block, &mut events)
                    }
                    BlockKind::Tool { .. } | BlockKind::Metadata { .. } => {
                        self.dispatch_withheld_block(&block, &mut events)
                    }
                },
            };
            if !progressed {
                break;
            }
        }
        events
    }

    /// End of stream. Flushes best-effort and reports protocol errors;
    /// data is never silently dropped.
    pub fn finish(&mut self) -> (Vec<StreamEvent>, Vec<ProtocolError>) {
        let mut events = Vec::new();
        let mut diagnostics = Vec::new();

        match self.active.take() {
            None => {
                if !self.buffer.is_empty() {
                    diagnostics.push(ProtocolError::TrailingBuffer {
                        len: self.buffer.len(),
                    });
                    events.push(StreamEvent::PlainText {
                        content: std::mem::take(&mut self.buffer),
                    });
                }
            }
            Some(block) => {
                let flushed = self.buffer.len();
                diagnostics.push(ProtocolError::UnterminatedBlock {
                    block: block.label,
                    flushed,
                });
                if flushed > 0 {
                    let content = std::mem::take(&mut self.buffer);
                    // The block never completed, so a withheld payload is
                    // released as plain text rather than as a close event.
                    events.push(match block.kind {
                        BlockKind::Reasoning => StreamEvent::ReasoningChunk { content },
                        BlockKind::Answer => StreamEvent::AnswerChunk { content },
                        BlockKind::Tool { .. } | BlockKind::Metadata { .. } => {
                            StreamEvent::PlainText { content }
                        }
                    });
                }
            }
        }

        for diagnostic in &diagnostics {
            tracing::warn!(error = %diagnostic, "protocol error at end of stream");
        }
        (events, diagnostics)
    }

    /// NEUTRAL: earliest complete open tag wins; an unresolved `<` whose
    /// tail is still a viable literal prefix is withheld, never guessed.
    /// Returns true when a tag matched and the loop should re-dispatch.
    fn dispatch_neutral(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        match self.vocabulary.scan(&self.buffer) {
            TagScan::Match { pos, entry } => {
                if pos > 0 {
                    // Pre-tag prefix is emitted even when whitespace-only:
                    // the event stream reproduces the response verbatim
                    // minus tag literals.
                    events.push(StreamEvent::PlainText {
                        content: self.buffer[..pos].to_string(),
                    });
                }
                let entry = self.vocabulary.entry(entry).clone();
                self.buffer.drain(..pos + entry.open.len());
                match &entry.kind {
                    BlockKind::Tool { name } => {
                        events.push(StreamEvent::ToolOpen { name: name.clone() });
                    }
                    BlockKind::Metadata { name } => {
                        events.push(StreamEvent::MetadataOpen { name: name.clone() });
                    }
                    BlockKind::Reasoning | BlockKind::Answer => {}
                }
                self.active = Some(ActiveBlock {
                    label: entry.label().to_string(),
                    close: entry.close.clone(),
                    kind: entry.kind,
                });
                true
            }
            TagScan::Candidate { pos } => {
                if pos > 0 {
                    events.push(StreamEvent::PlainText {
                        content: self.buffer[..pos].to_string(),
                    });
                    self.buffer.drain(..pos);
                }
                // Hard bound on the withheld region. The scan only
                // reports viable prefixes, which are shorter than the
                // longest literal, so the buffer stays under the
                // threshold; this enforces the bound regardless.
                if self.buffer.len() > self.lookahead {
                    events.push(StreamEvent::PlainText {
                        content: std::mem::take(&mut self.buffer),
                    });
                }
                false
            }
            TagScan::Nothing => {
                if !self.buffer.is_empty() {
                    events.push(StreamEvent::PlainText {
                        content: std::mem::take(&mut self.buffer),
                    });
                }
                false
            }
        }
    }

    /// IN_REASONING / IN_ANSWER: release content eagerly, withholding
    /// only close-literal-length − 1 bytes against a split close tag.
    fn dispatch_prose_block(&mut self, block: &ActiveBlock, events: &mut Vec<StreamEvent>) -> bool {
        if let Some(i) = self.buffer.find(&block.close) {
            if i > 0 {
                let content = self.buffer[..i].to_string();
                events.push(Self::prose_chunk(&block.kind, content));
            }
            self.buffer.drain(..i + block.close.len());
            self.active = None;
            true
        } else {
            let margin = block.close.len() - 1;
            let mut release = self.buffer.len().saturating_sub(margin);
            while release > 0 && !self.buffer.is_char_boundary(release) {
                release -= 1;
            }
            if release > 0 {
                let content = self.buffer[..release].to_string();
                events.push(Self::prose_chunk(&block.kind, content));
                self.buffer.drain(..release);
            }
            false
        }
    }

    /// IN_TOOL / IN_METADATA: accumulate silently; a single close event
    /// carries the entire raw payload. Foreign close tags and open tags
    /// inside the payload are ordinary content — the protocol is flat.
    fn dispatch_withheld_block(
        &mut self,
        block: &ActiveBlock,
        events: &mut Vec<StreamEvent>,
    ) -> bool {
        if let Some(i) = self.buffer.find(&block.close) {
            let raw = self.buffer[..i].to_string();
            self.buffer.drain(..i + block.close.len());
            match &block.kind {
                BlockKind::Tool { name } => {
                    events.push(StreamEvent::ToolClose {
                        name: name.clone(),
                        raw,
                    });
                }
                BlockKind::Metadata { name } => {
                    events.push(StreamEvent::MetadataClose {
                        name: name.clone(),
                        raw,
                    });
                }
                BlockKind::Reasoning | BlockKind::Answer => unreachable!("withheld dispatch"),
            }
            self.active = None;
            true
        } else {
            false
        }
    }

    fn prose_chunk(kind: &BlockKind, content: String) -> StreamEvent {
        match kind {
            BlockKind::Reasoning => StreamEvent::ReasoningChunk { content },
            BlockKind::Answer => StreamEvent::AnswerChunk { content },
            BlockKind::Tool { .. } | BlockKind::Metadata { .. } => {
                unreachable!("prose dispatch")
            }
        }
    }
}

/// NewlineNormalizer composed strictly before the classifier — the unit
/// the orchestrator drives per response stream.
#[derive(Debug)]
pub struct ResponsePipeline {
    normalizer: NewlineNormalizer,
    classifier: StreamingClassifier,
}

impl ResponsePipeline {
    pub fn new(vocabulary: TagVocabulary, config: &ClassifierConfig) -> Self {
        Self {
            normalizer: NewlineNormalizer::new(),
            classifier: StreamingClassifier::new(vocabulary, config),
        }
    }

    pub fn feed(&mut self, fragment: &str) -> Vec<StreamEvent> {
        let cleaned = self.normalizer.feed(fragment);
        self.classifier.feed(&cleaned)
    }

    pub fn finish(&mut self) -> (Vec<StreamEvent>, Vec<ProtocolError>) {
        let tail = self.normalizer.finish();
        let mut events = self.classifier.feed(&tail);
        let (trailing, diagnostics) = self.classifier.finish();
        events.extend(trailing);
        (events, diagnostics)
    }
}
