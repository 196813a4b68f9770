//! # Tagflow Stream
//!
//! The streaming layer: raw model-output fragments in, classified
//! [`StreamEvent`](tagflow_core::StreamEvent)s out.
//!
//! Three pieces, composed in order:
//! - [`TagVocabulary`] — the fixed table of open/close literals
//! - [`NewlineNormalizer`] — collapses multi-break runs across fragments
//! - [`StreamingClassifier`] — the per-stream finite-state machine
//!
//! [`ResponsePipeline`] wires normalizer and classifier together; the
//! orchestrator drives one pipeline per model response.

pub mod classifier;
pub mod normalizer;
pub mod vocabulary;

pub use classifier::{ClassifierConfig, ResponsePipeline, StreamingClassifier};
pub use normalizer::NewlineNormalizer;
pub use vocabulary::{BlockKind, TagEntry, TagScan, TagVocabulary, METADATA_BLOCKS};
