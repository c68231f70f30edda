//! Parser for `/** ... */` documentation blocks carrying `@key value`
//! metadata.

use crate::text::Span;

/// Key assigned to the text that precedes the first `@` marker
pub const DEFAULT_KEY: &str = "hint";

/// One `@key[.subkey] value` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlockEntry {
    /// Lowercased
    pub key: String,
    /// Lowercased
    pub subkey: Option<String>,
    pub value: String,
    pub value_span: Span,
}

/// Ordered entries of one documentation block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub entries: Vec<DocBlockEntry>,
}

impl DocBlock {
    /// The first entry for `key` without a subkey
    pub fn entry(&self, key: &str) -> Option<&DocBlockEntry> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.key == key && entry.subkey.is_none())
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|entry| entry.value.as_str())
    }

    /// The first `@key.subkey` entry
    pub fn sub_entry(&self, key: &str, subkey: &str) -> Option<&DocBlockEntry> {
        let key = key.to_lowercase();
        let subkey = subkey.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.key == key && entry.subkey.as_deref() == Some(subkey.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the interior of a documentation block (delimiters excluded).
pub fn parse_doc_block(text: &str, span: Span) -> DocBlock {
    let end = span.end.min(text.len());
    let mut entries: Vec<DocBlockEntry> = Vec::new();
    let mut line_start = span.start;

    while line_start <= end {
        let line_end = text[line_start..end]
            .find('\n')
            .map_or(end, |rel| line_start + rel);
        parse_line(text, line_start, line_end, &mut entries);
        if line_end >= end {
            break;
        }
        line_start = line_end + 1;
    }

    DocBlock { entries }
}

fn parse_line(text: &str, start: usize, end: usize, entries: &mut Vec<DocBlockEntry>) {
    let bytes = text.as_bytes();
    let mut idx = start;
    while idx < end && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    while idx < end && bytes[idx] == b'*' {
        idx += 1;
    }
    let mut content_end = end;
    while content_end > idx && bytes[content_end - 1].is_ascii_whitespace() {
        content_end -= 1;
    }
    while idx < content_end && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    if idx >= content_end {
        return;
    }

    if bytes[idx] == b'@' {
        let marker_start = idx + 1;
        let mut marker_end = marker_start;
        while marker_end < content_end
            && (bytes[marker_end].is_ascii_alphanumeric() || matches!(bytes[marker_end], b'_' | b'.' | b'-'))
        {
            marker_end += 1;
        }
        if marker_end > marker_start {
            let marker = text[marker_start..marker_end].to_lowercase();
            let (key, subkey) = match marker.split_once('.') {
                Some((key, subkey)) => (key.to_string(), Some(subkey.to_string())),
                None => (marker, None),
            };
            let mut value_start = marker_end;
            while value_start < content_end && bytes[value_start].is_ascii_whitespace() {
                value_start += 1;
            }
            let value_span = Span::new(value_start, content_end);
            entries.push(DocBlockEntry {
                key,
                subkey,
                value: value_span.slice(text).to_string(),
                value_span,
            });
            return;
        }
    }

    let content = &text[idx..content_end];
    match entries.last_mut() {
        Some(previous) => {
            if previous.value.is_empty() {
                previous.value = content.to_string();
                previous.value_span = Span::new(idx, content_end);
            } else {
                previous.value.push(' ');
                previous.value.push_str(content);
                previous.value_span = Span::new(previous.value_span.start, content_end);
            }
        }
        None => entries.push(DocBlockEntry {
            key: DEFAULT_KEY.to_string(),
            subkey: None,
            value: content.to_string(),
            value_span: Span::new(idx, content_end),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DocBlock {
        parse_doc_block(text, Span::new(0, text.len()))
    }

    #[test]
    fn test_leading_text_becomes_hint() {
        let doc = parse("\n * Greets people.\n * Politely.\n * @output false\n ");
        assert_eq!(doc.value("hint"), Some("Greets people. Politely."));
        assert_eq!(doc.value("output"), Some("false"));
    }

    #[test]
    fn test_subkeys_are_lowercased_values_are_not() {
        let doc = parse(" * @Name.Hint The Person's Name\n");
        let entry = doc.sub_entry("name", "hint").unwrap();
        assert_eq!(entry.key, "name");
        assert_eq!(entry.subkey.as_deref(), Some("hint"));
        assert_eq!(entry.value, "The Person's Name");
    }

    #[test]
    fn test_continuation_extends_value_span() {
        let text = " * @extends foo.Bar\n *   and more";
        let doc = parse(text);
        let entry = doc.entry("extends").unwrap();
        assert_eq!(entry.value, "foo.Bar and more");
        assert_eq!(entry.value_span.start, text.find("foo").unwrap());
        assert_eq!(entry.value_span.end, text.len());
    }

    #[test]
    fn test_single_line_block() {
        let text = " @extends foo.Bar ";
        let doc = parse(text);
        let entry = doc.entry("extends").unwrap();
        assert_eq!(entry.value, "foo.Bar");
        assert_eq!(entry.value_span.slice(text), "foo.Bar");
    }

    #[test]
    fn test_marker_without_value_takes_next_line() {
        let doc = parse(" * @hint\n * Described below\n");
        assert_eq!(doc.value("hint"), Some("Described below"));
    }

    #[test]
    fn test_empty_block() {
        assert!(parse("\n *\n ").is_empty());
    }
}
