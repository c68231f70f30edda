//! Immutable document snapshots and the per-parse state derived from them.

use crate::parser::tags::{Tag, scan_tags_by_name};
use crate::text::{LineIndex, Span, is_in_spans, script_comment_spans, tag_comment_spans};
use crate::types::{Location, Position, Range};
use std::path::{Path, PathBuf};

/// A snapshot of one source file's text
#[derive(Debug, Clone)]
pub struct Document {
    uri: PathBuf,
    text: String,
    line_index: LineIndex,
}

impl Document {
    pub fn new(uri: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            uri: uri.into(),
            text,
            line_index,
        }
    }

    pub fn uri(&self) -> &Path {
        &self.uri
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Span covering the whole text
    pub fn full_span(&self) -> Span {
        Span::new(0, self.text.len())
    }

    pub fn range(&self, span: Span) -> Range {
        self.line_index.range(span)
    }

    pub fn span(&self, range: &Range) -> Span {
        self.line_index.span(range)
    }

    pub fn location(&self, span: Span) -> Location {
        Location::new(self.uri.clone(), self.range(span))
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position_at(offset)
    }

    pub fn offset_at(&self, position: Position) -> Option<usize> {
        self.line_index.offset_at(position)
    }

    /// File name without its extension
    pub fn file_stem(&self) -> String {
        self.uri
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Whether the file extension matches one of `extensions` (no dots)
    pub fn has_extension(&self, extensions: &[String]) -> bool {
        self.uri
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext)))
    }
}

/// Dialect-dependent facts about a document computed once per parse:
/// where comments are and where embedded script blocks are.
#[derive(Debug, Clone)]
pub struct DocumentContext<'a> {
    pub document: &'a Document,
    pub is_script: bool,
    comment_spans: Vec<Span>,
    embedded_script_spans: Vec<Span>,
}

impl<'a> DocumentContext<'a> {
    pub fn new(document: &'a Document, is_script: bool) -> Self {
        let full = document.full_span();
        let text = document.text();

        if is_script {
            return Self {
                document,
                is_script,
                comment_spans: script_comment_spans(text, full),
                embedded_script_spans: Vec::new(),
            };
        }

        let mut comment_spans = tag_comment_spans(text, full);
        let embedded_script_spans: Vec<Span> = scan_tags_by_name(text, "cfscript", full)
            .into_iter()
            .filter(|tag| !is_in_spans(&comment_spans, tag.span.start))
            .filter_map(|tag| tag.body_span)
            .collect();
        for script in &embedded_script_spans {
            comment_spans.extend(script_comment_spans(text, *script));
        }
        comment_spans.sort();

        Self {
            document,
            is_script,
            comment_spans,
            embedded_script_spans,
        }
    }

    pub fn text(&self) -> &'a str {
        self.document.text()
    }

    pub fn is_comment(&self, offset: usize) -> bool {
        is_in_spans(&self.comment_spans, offset)
    }

    pub fn comment_spans(&self) -> &[Span] {
        &self.comment_spans
    }

    /// Bodies of `<cfscript>` blocks in a tag-dialect document
    pub fn embedded_script_spans(&self) -> &[Span] {
        &self.embedded_script_spans
    }

    /// Every region written in script syntax: the whole document for
    /// script components, otherwise the embedded script blocks.
    pub fn script_spans(&self) -> Vec<Span> {
        if self.is_script {
            vec![self.document.full_span()]
        } else {
            self.embedded_script_spans.clone()
        }
    }

    /// By-name tag scan that ignores tags starting inside comments
    pub fn tags_by_name(&self, name: &str, span: Span) -> Vec<Tag> {
        scan_tags_by_name(self.text(), name, span)
            .into_iter()
            .filter(|tag| !self.is_comment(tag.span.start))
            .collect()
    }

    pub fn range(&self, span: Span) -> Range {
        self.document.range(span)
    }

    pub fn location(&self, span: Span) -> Location {
        self.document.location(span)
    }
}
