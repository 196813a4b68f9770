//! The tag vocabulary — the fixed literal table the classifier matches.
//!
//! This is deliberately not an XML parser. The protocol is a small, flat,
//! known-in-advance set of open/close literal pairs; a tag exists only
//! once its full literal is present in the buffer. Adding a tool or
//! metadata kind is purely additive — a table entry, no classifier change.

use serde::{Deserialize, Serialize};

/// What a matched block classifies as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    /// The model's visible reasoning block.
    Reasoning,
    /// The terminal answer block.
    Answer,
    /// A tool-invocation block; `name` is the tool's registry name.
    Tool { name: String },
    /// A metadata block, accumulated but never rendered.
    Metadata { name: String },
}

/// One entry in the vocabulary: a literal pair and its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    /// Full open literal, including angle brackets (e.g. `<thinking>`).
    pub open: String,
    /// Full close literal (e.g. `</thinking>`).
    pub close: String,
    /// Classification of the delimited block.
    pub kind: BlockKind,
}

impl TagEntry {
    /// The tag name without brackets, used in diagnostics.
    pub fn label(&self) -> &str {
        self.open.trim_start_matches('<').trim_end_matches('>')
    }
}

/// Result of scanning a buffer for the earliest open tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScan {
    /// A complete open literal begins at `pos`.
    Match { pos: usize, entry: usize },
    /// An unresolved `<` at `pos`: the buffer's tail is still a viable
    /// prefix of at least one open literal. Never guess — wait.
    Candidate { pos: usize },
    /// No tag and no viable candidate anywhere in the buffer.
    Nothing,
}

/// The static, versioned tag table.
#[derive(Debug, Clone)]
pub struct TagVocabulary {
    entries: Vec<TagEntry>,
    longest_open: usize,
}

/// The fixed metadata block names (accumulated, never shown).
pub const METADATA_BLOCKS: [&str; 4] = ["summary", "sources", "confidence", "suggestions"];

impl TagVocabulary {
    /// The standard vocabulary: one reasoning block, one answer block, and
    /// the fixed metadata set. Tool entries are added per registered tool.
    pub fn standard() -> Self {
        let mut vocab = Self {
            entries: Vec::new(),
            longest_open: 0,
        };
        vocab.push("thinking", BlockKind::Reasoning);
        vocab.push("present_answer", BlockKind::Answer);
        for name in METADATA_BLOCKS {
            vocab.push(
                name,
                BlockKind::Metadata {
                    name: name.to_string(),
                },
            );
        }
        vocab
    }

    /// Add a tool block (`<tool_{name}>`). Purely additive.
    pub fn with_tool(mut self, name: &str) -> Self {
        self.push(
            &format!("tool_{name}"),
            BlockKind::Tool {
                name: name.to_string(),
            },
        );
        self
    }

    /// Add several tool blocks at once.
    pub fn with_tools<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            self = self.with_tool(name);
        }
        self
    }

    fn push(&mut self, tag: &str, kind: BlockKind) {
        let entry = TagEntry {
            open: format!("<{tag}>"),
            close: format!("</{tag}>"),
            kind,
        };
        self.longest_open = self.longest_open.max(entry.open.len());
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> &TagEntry {
        &self.entries[idx]
    }

    /// Length in bytes of the longest open literal. The classifier's
    /// lookahead threshold must be at least this.
    pub fn longest_open_len(&self) -> usize {
        self.longest_open
    }

    /// Scan for the earliest complete open tag, or the earliest `<` whose
    /// tail could still complete one.
    ///
    /// A `<` whose tail already disproves every literal is ordinary text
    /// and scanning continues past it. A viable prefix necessarily runs to
    /// the end of the buffer, so `Candidate` and a later `Match` are
    /// mutually exclusive.
    pub fn scan(&self, buffer: &str) -> TagScan {
        for (pos, ch) in buffer.char_indices() {
            if ch != '<' {
                continue;
            }
            let tail = &buffer[pos..];
            for (idx, entry) in self.entries.iter().enumerate() {
                if tail.starts_with(&entry.open) {
                    return TagScan::Match { pos, entry: idx };
                }
            }
            if self.entries.iter().any(|e| e.open.starts_with(tail)) {
                return TagScan::Candidate { pos };
            }
        }
        TagScan::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_vocabulary_contents() {
        let vocab = TagVocabulary::standard();
        let opens: Vec<&str> = vocab.entries().iter().map(|e| e.open.as_str()).collect();
        assert!(opens.contains(&"<thinking>"));
        assert!(opens.contains(&"<present_answer>"));
        assert!(opens.contains(&"<sources>"));
        assert_eq!(vocab.entries().len(), 6);
    }

    #[test]
    fn tool_entries_are_additive() {
        let vocab = TagVocabulary::standard().with_tool("search").with_tool("web_search");
        let entry = vocab
            .entries()
            .iter()
            .find(|e| e.open == "<tool_search>")
            .unwrap();
        assert_eq!(
            entry.kind,
            BlockKind::Tool {
                name: "search".into()
            }
        );
        assert_eq!(entry.close, "</tool_search>");
    }

    #[test]
    fn longest_open_tracks_additions() {
        let vocab = TagVocabulary::standard();
        assert_eq!(vocab.longest_open_len(), "<present_answer>".len());
        let vocab = vocab.with_tool("a_rather_long_tool_name");
        assert_eq!(vocab.longest_open_len(), "<tool_a_rather_long_tool_name>".len());
    }

    #[test]
    fn scan_finds_earliest_complete_match() {
        let vocab = TagVocabulary::standard();
        assert_eq!(
            vocab.scan("hello <thinking>rest"),
            TagScan::Match { pos: 6, entry: 0 }
        );
    }

    #[test]
    fn scan_skips_disproven_angle_brackets() {
        let vocab = TagVocabulary::standard();
        // "<x" can never open a tag; the later complete tag still matches.
        assert_eq!(
            vocab.scan("a<x b<thinking>"),
            TagScan::Match { pos: 5, entry: 0 }
        );
    }

    #[test]
    fn scan_reports_viable_prefix_as_candidate() {
        let vocab = TagVocabulary::standard();
        assert_eq!(vocab.scan("text <thi"), TagScan::Candidate { pos: 5 });
        assert_eq!(vocab.scan("text <"), TagScan::Candidate { pos: 5 });
    }

    #[test]
    fn scan_nothing_when_no_angle_bracket_is_viable() {
        let vocab = TagVocabulary::standard();
        assert_eq!(vocab.scan("a < b and 2<3"), TagScan::Nothing);
        assert_eq!(vocab.scan("plain text"), TagScan::Nothing);
    }

    #[test]
    fn label_strips_brackets() {
        let vocab = TagVocabulary::standard().with_tool("search");
        let entry = vocab
            .entries()
            .iter()
            .find(|e| matches!(e.kind, BlockKind::Tool { .. }))
            .unwrap();
        assert_eq!(entry.label(), "tool_search");
    }
}
