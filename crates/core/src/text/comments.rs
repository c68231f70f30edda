//! Comment detection for both CFML dialects.

use super::Span;
use super::scan::{StringState, is_string_delimiter};

const TAG_COMMENT_OPEN: &str = "<!---";
const TAG_COMMENT_CLOSE: &str = "--->";

/// Spans of `<!--- ... --->` comments inside `span`.
///
/// Tag comments nest; an unterminated comment runs to the end of `span`.
pub fn tag_comment_spans(text: &str, span: Span) -> Vec<Span> {
    let end = span.end.min(text.len());
    let mut spans = Vec::new();
    let mut cursor = span.start;

    while cursor < end {
        let Some(rel) = text[cursor..end].find(TAG_COMMENT_OPEN) else {
            break;
        };
        let comment_start = cursor + rel;
        let mut depth = 1;
        let mut idx = comment_start + TAG_COMMENT_OPEN.len();

        while idx < end && depth > 0 {
            let rest = &text[idx..end];
            if rest.starts_with(TAG_COMMENT_OPEN) {
                depth += 1;
                idx += TAG_COMMENT_OPEN.len();
            } else if rest.starts_with(TAG_COMMENT_CLOSE) {
                depth -= 1;
                idx += TAG_COMMENT_CLOSE.len();
            } else {
                idx += rest.chars().next().map_or(1, char::len_utf8);
            }
        }

        let comment_end = idx.min(end);
        spans.push(Span::new(comment_start, comment_end));
        cursor = comment_end;
    }

    spans
}

/// Spans of `//` line comments and `/* ... */` block comments (doc blocks
/// included) inside `span`, skipping comment markers that sit in strings.
pub fn script_comment_spans(text: &str, span: Span) -> Vec<Span> {
    let bytes = text.as_bytes();
    let end = span.end.min(bytes.len());
    let mut spans = Vec::new();
    let mut strings = StringState::default();
    let mut idx = span.start;

    while idx < end {
        let byte = bytes[idx];
        if strings.in_string() || is_string_delimiter(byte as char) {
            idx += strings.advance(bytes, idx);
            continue;
        }

        if byte == b'/' && idx + 1 < end {
            match bytes[idx + 1] {
                b'/' => {
                    let stop = text[idx..end].find('\n').map_or(end, |rel| idx + rel);
                    spans.push(Span::new(idx, stop));
                    idx = stop;
                    continue;
                }
                b'*' => {
                    let stop = text[idx + 2..end]
                        .find("*/")
                        .map_or(end, |rel| idx + 2 + rel + 2);
                    spans.push(Span::new(idx, stop));
                    idx = stop;
                    continue;
                }
                _ => {}
            }
        }

        idx += 1;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole(text: &str) -> Span {
        Span::new(0, text.len())
    }

    #[test]
    fn test_tag_comments() {
        let text = "<cfset a = 1><!--- note ---><cfset b = 2>";
        let spans = tag_comment_spans(text, whole(text));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].slice(text), "<!--- note --->");
    }

    #[test]
    fn test_nested_tag_comments() {
        let text = "<!--- outer <!--- inner ---> still ---> code";
        let spans = tag_comment_spans(text, whole(text));
        assert_eq!(spans.len(), 1);
        assert!(spans[0].slice(text).ends_with("still --->"));
    }

    #[test]
    fn test_unterminated_tag_comment() {
        let text = "a <!--- open";
        let spans = tag_comment_spans(text, whole(text));
        assert_eq!(spans, vec![Span::new(2, text.len())]);
    }

    #[test]
    fn test_script_comments() {
        let text = "a = 1; // one\n/* two */ b = \"//not\"; /** doc */";
        let spans = script_comment_spans(text, whole(text));
        let comments: Vec<&str> = spans.iter().map(|s| s.slice(text)).collect();
        assert_eq!(comments, vec!["// one", "/* two */", "/** doc */"]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let text = "x = 1; /* never closed";
        let spans = script_comment_spans(text, whole(text));
        assert_eq!(spans, vec![Span::new(7, text.len())]);
    }
}
