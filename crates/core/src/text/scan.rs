//! String-aware scanning over raw CFML text.
//!
//! All scanners work on bytes: every delimiter they look for is ASCII, so a
//! match can never land inside a multi-byte UTF-8 sequence.

use super::Span;

/// Quote characters that open a string literal
pub fn is_string_delimiter(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Embedded-expression delimiter inside CFML strings (`"Hello #name#"`)
const EXPRESSION_DELIMITER: u8 = b'#';

/// String-literal state shared by the scanners in this module.
///
/// Inside a string, `#` toggles an embedded expression in which quote
/// characters no longer terminate the string. Doubled delimiters (`""`,
/// `''`, `##`) are escapes.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StringState {
    delimiter: Option<u8>,
    in_expression: bool,
}

impl StringState {
    pub(crate) fn in_string(&self) -> bool {
        self.delimiter.is_some()
    }

    /// Consume the byte at `idx`, returning how many bytes were used.
    ///
    /// Outside a string this only reacts to quote characters.
    pub(crate) fn advance(&mut self, bytes: &[u8], idx: usize) -> usize {
        let byte = bytes[idx];
        let next = bytes.get(idx + 1).copied();

        let Some(delimiter) = self.delimiter else {
            if is_string_delimiter(byte as char) {
                self.delimiter = Some(byte);
            }
            return 1;
        };

        if byte == EXPRESSION_DELIMITER {
            if !self.in_expression && next == Some(EXPRESSION_DELIMITER) {
                return 2;
            }
            self.in_expression = !self.in_expression;
            return 1;
        }

        if self.in_expression {
            return 1;
        }

        if byte == delimiter {
            if next == Some(delimiter) {
                return 2;
            }
            self.delimiter = None;
        }
        1
    }
}

/// Find the close character matching the open character at `start`.
///
/// Nested pairs and string literals are skipped. When `start` is not on an
/// `open` character the scan behaves as if it already were inside the pair.
/// Returns the offset of the matching close character, or `None` when the
/// text ends first.
pub fn find_matching_close(text: &str, start: usize, open: char, close: char) -> Option<usize> {
    let bytes = text.as_bytes();
    let (open, close) = (open as u8, close as u8);
    let mut depth: usize = if bytes.get(start) == Some(&open) { 0 } else { 1 };
    let mut strings = StringState::default();
    let mut idx = start;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if strings.in_string() || is_string_delimiter(byte as char) {
            idx += strings.advance(bytes, idx);
            continue;
        }
        if byte == open {
            depth += 1;
        } else if byte == close {
            if depth <= 1 {
                return Some(idx);
            }
            depth -= 1;
        }
        idx += 1;
    }

    None
}

/// Find the next `target` in `[start, end)` that is outside strings and
/// outside any nested `()`, `[]` or `{}` group.
pub fn next_unescaped_char(text: &str, start: usize, end: usize, target: char) -> Option<usize> {
    let bytes = text.as_bytes();
    let end = end.min(bytes.len());
    let target = target as u8;
    let mut depth: usize = 0;
    let mut strings = StringState::default();
    let mut idx = start;

    while idx < end {
        let byte = bytes[idx];
        if strings.in_string() || is_string_delimiter(byte as char) {
            if byte == target && !strings.in_string() && depth == 0 {
                return Some(idx);
            }
            idx += strings.advance(bytes, idx);
            continue;
        }
        if byte == target && depth == 0 {
            return Some(idx);
        }
        match byte {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        idx += 1;
    }

    None
}

/// Split `[start, end)` on every top-level `separator`
pub fn split_unescaped(text: &str, start: usize, end: usize, separator: char) -> Vec<Span> {
    let end = end.min(text.len());
    let mut parts = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        match next_unescaped_char(text, cursor, end, separator) {
            Some(found) => {
                parts.push(Span::new(cursor, found));
                cursor = found + 1;
            }
            None => {
                parts.push(Span::new(cursor, end));
                break;
            }
        }
    }

    parts
}

/// Strip one layer of matching quotes, or a single `#...#` wrapper,
/// from a literal value.
pub fn unwrap_literal(value: &str) -> &str {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        let quoted = is_string_delimiter(first as char) && first == last;
        let expression = first == EXPRESSION_DELIMITER
            && last == EXPRESSION_DELIMITER
            && !trimmed[1..trimmed.len() - 1].contains('#');
        if quoted || expression {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Byte offset of the first non-whitespace character at or after `idx`
pub fn skip_whitespace(text: &str, idx: usize) -> usize {
    let bytes = text.as_bytes();
    let mut idx = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

/// Characters allowed in a CFML identifier after the first one
pub fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_close_skips_nesting_and_strings() {
        let text = r#"foo(a, b(c, d), "e,f")"#;
        assert_eq!(find_matching_close(text, 3, '(', ')'), Some(text.len() - 1));
    }

    #[test]
    fn test_find_matching_close_ignores_delimiters_in_strings() {
        let text = r#"(")", ')')"#;
        assert_eq!(find_matching_close(text, 0, '(', ')'), Some(9));
    }

    #[test]
    fn test_find_matching_close_handles_embedded_expressions() {
        let text = r##"{ x = "#foo("}")#"; }"##;
        assert_eq!(find_matching_close(text, 0, '{', '}'), Some(text.len() - 1));
    }

    #[test]
    fn test_find_matching_close_handles_doubled_quotes() {
        let text = r#"(a = "say ""hi)"" now")"#;
        assert_eq!(find_matching_close(text, 0, '(', ')'), Some(text.len() - 1));
    }

    #[test]
    fn test_find_matching_close_unbalanced() {
        assert_eq!(find_matching_close("foo(a, b", 3, '(', ')'), None);
        assert_eq!(find_matching_close("", 0, '(', ')'), None);
    }

    #[test]
    fn test_find_matching_close_from_inside() {
        let text = "a, (b), c) tail";
        assert_eq!(find_matching_close(text, 0, '(', ')'), Some(9));
    }

    #[test]
    fn test_next_unescaped_char() {
        let text = r#"a = "x,y", b = f(1, 2), c"#;
        let first = next_unescaped_char(text, 0, text.len(), ',').unwrap();
        assert_eq!(&text[..first], r#"a = "x,y""#);
        let second = next_unescaped_char(text, first + 1, text.len(), ',').unwrap();
        assert_eq!(&text[first + 1..second], " b = f(1, 2)");
        assert_eq!(next_unescaped_char(text, second + 1, text.len(), ','), None);
    }

    #[test]
    fn test_split_unescaped() {
        let text = r#"required string name="a,b", numeric age"#;
        let parts: Vec<&str> = split_unescaped(text, 0, text.len(), ',')
            .into_iter()
            .map(|span| span.slice(text).trim())
            .collect();
        assert_eq!(parts, vec![r#"required string name="a,b""#, "numeric age"]);
    }

    #[test]
    fn test_split_unescaped_empty() {
        let parts = split_unescaped("", 0, 0, ',');
        assert_eq!(parts, vec![Span::new(0, 0)]);
    }

    #[test]
    fn test_unwrap_literal() {
        assert_eq!(unwrap_literal(r#""x""#), "x");
        assert_eq!(unwrap_literal("'it'"), "it");
        assert_eq!(unwrap_literal("#now()#"), "now()");
        assert_eq!(unwrap_literal("#a# & #b#"), "#a# & #b#");
        assert_eq!(unwrap_literal("42"), "42");
        assert_eq!(unwrap_literal(r#""mismatch'"#), r#""mismatch'"#);
    }
}
