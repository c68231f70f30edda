//! Lexical helpers shared by every scanner: byte spans, line/column
//! conversion, string-aware delimiter matching and comment detection.

pub mod comments;
pub mod line_index;
pub mod scan;

pub use comments::{script_comment_spans, tag_comment_spans};
pub use line_index::LineIndex;
pub use scan::{
    find_matching_close, is_identifier_byte, is_string_delimiter, next_unescaped_char,
    skip_whitespace, split_unescaped, unwrap_literal,
};

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into a document's text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn contains_span(&self, other: &Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// The text covered by this span, clamped to the input
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let end = self.end.min(text.len());
        let start = self.start.min(end);
        text.get(start..end).unwrap_or("")
    }
}

/// Check whether an offset falls inside any of the given spans
pub fn is_in_spans(spans: &[Span], offset: usize) -> bool {
    spans.iter().any(|span| span.contains(offset))
}
