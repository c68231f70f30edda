//! Generic `name=value` attribute scanner used for tag attributes, script
//! component headers and inline function/argument/property metadata.

use crate::text::Span;
use crate::text::scan::StringState;
use std::collections::BTreeMap;

/// One attribute occurrence; values are kept exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written in source
    pub name: String,
    pub name_span: Span,
    /// `None` for valueless (boolean shorthand) attributes
    pub value: Option<String>,
    /// Span of the value without its surrounding quotes
    pub value_span: Option<Span>,
}

/// Attributes keyed by lowercased name; the first occurrence of a name wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: BTreeMap<String, Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.get(&name.to_lowercase())
    }

    /// The attribute's value; valueless attributes yield `None`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|attr| attr.value.as_deref())
    }

    /// Parse the attribute as a boolean, treating a bare name as `true`
    pub fn flag(&self, name: &str) -> Option<bool> {
        let attr = self.get(name)?;
        match attr.value.as_deref() {
            None => Some(true),
            Some(value) => parse_boolean(value),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn insert(&mut self, attribute: Attribute) {
        self.entries
            .entry(attribute.name.to_lowercase())
            .or_insert(attribute);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in lowercased-name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.entries.iter()
    }
}

/// Interpret a CFML boolean literal: `true`/`yes`/non-zero numbers are
/// truthy, `false`/`no`/zero are falsy, anything else is unknown.
pub fn parse_boolean(value: &str) -> Option<bool> {
    let value = crate::text::unwrap_literal(value);
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        other => other.parse::<f64>().ok().map(|number| number != 0.0),
    }
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b':' | b'$')
}

/// Scan `span` of `text` for attributes.
///
/// With `allowed` set, names outside the list are skipped entirely.
pub fn parse_attributes(text: &str, span: Span, allowed: Option<&[&str]>) -> Attributes {
    let bytes = text.as_bytes();
    let end = span.end.min(bytes.len());
    let mut attributes = Attributes::new();
    let mut cursor = span.start;

    while cursor < end {
        let byte = bytes[cursor];

        if byte == b'"' || byte == b'\'' {
            cursor = skip_quoted(bytes, cursor, end);
            continue;
        }
        if !is_name_byte(byte) {
            cursor += 1;
            continue;
        }

        let name_start = cursor;
        while cursor < end && is_name_byte(bytes[cursor]) {
            cursor += 1;
        }
        let name_span = Span::new(name_start, cursor);

        let mut lookahead = cursor;
        while lookahead < end && bytes[lookahead].is_ascii_whitespace() {
            lookahead += 1;
        }

        let mut value_span = None;
        if lookahead < end && bytes[lookahead] == b'=' {
            let mut value_start = lookahead + 1;
            while value_start < end && bytes[value_start].is_ascii_whitespace() {
                value_start += 1;
            }
            if value_start < end {
                let quote = bytes[value_start];
                if quote == b'"' || quote == b'\'' {
                    let close = skip_quoted(bytes, value_start, end);
                    let content_end = if close <= end && close > value_start + 1 && bytes[close - 1] == quote {
                        close - 1
                    } else {
                        close
                    };
                    value_span = Some(Span::new(value_start + 1, content_end));
                    cursor = close;
                } else {
                    let mut value_end = value_start;
                    while value_end < end
                        && !bytes[value_end].is_ascii_whitespace()
                        && !matches!(bytes[value_end], b'>' | b'"' | b'\'')
                    {
                        value_end += 1;
                    }
                    value_span = Some(Span::new(value_start, value_end));
                    cursor = value_end;
                }
            } else {
                cursor = value_start;
            }
        }

        let name = &text[name_span.start..name_span.end];
        let keep = allowed.is_none_or(|allowed| {
            allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
        });
        if keep {
            attributes.insert(Attribute {
                name: name.to_string(),
                name_span,
                value: value_span.map(|span| span.slice(text).to_string()),
                value_span,
            });
        }
    }

    attributes
}

/// Return the offset just past the string starting at `start`
fn skip_quoted(bytes: &[u8], start: usize, end: usize) -> usize {
    let mut strings = StringState::default();
    let mut idx = start;
    idx += strings.advance(bytes, idx);
    while idx < end && strings.in_string() {
        idx += strings.advance(bytes, idx);
    }
    idx.min(end)
}
