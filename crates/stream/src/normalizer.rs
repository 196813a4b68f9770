//! Streaming newline normalizer.
//!
//! Collapses runs of two or more consecutive line breaks to exactly one;
//! a lone break passes through unchanged. A run straddling fragment
//! boundaries is handled by carrying the trailing break run and releasing
//! it (collapsed) only when a non-break character arrives or the stream
//! ends. Composed strictly before the classifier — safe because tag
//! literals never contain line breaks.

/// Carry-buffer newline filter. One instance per response stream.
#[derive(Debug, Default)]
pub struct NewlineNormalizer {
    /// Break characters seen since the last non-break character.
    pending_breaks: usize,
}

impl NewlineNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment; returns the normalized text that is safe to
    /// release. Trailing break runs are withheld until resolved.
    pub fn feed(&mut self, fragment: &str) -> String {
        let mut out = String::with_capacity(fragment.len());
        for ch in fragment.chars() {
            // \r and \r\n count toward the same run as \n.
            if ch == '\n' || ch == '\r' {
                self.pending_breaks += 1;
            } else {
                if self.pending_breaks > 0 {
                    out.push('\n');
                    self.pending_breaks = 0;
                }
                out.push(ch);
            }
        }
        out
    }

    /// Flush the carry buffer at end of stream.
    pub fn finish(&mut self) -> String {
        if self.pending_breaks > 0 {
            self.pending_breaks = 0;
            "\n".to_string()
        } else {
            String::new()
        }
    }
}
