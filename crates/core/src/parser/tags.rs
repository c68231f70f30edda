//! Tag scanning.
//!
//! Two strategies are provided. [`scan_tags_by_name`] uses a generated
//! regular expression per tag name and is cheap for single-name
//! extraction, but does not pair up nested tags of the same name.
//! [`scan_tags`] is a single-pass state machine that tracks an unclosed-tag
//! stack and pairs start and end tags properly.

use super::attributes::{Attributes, parse_attributes};
use crate::text::scan::StringState;
use crate::text::{Span, tag_comment_spans};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

/// Tags that never carry a body or an end tag
pub const BODILESS_TAGS: &[&str] = &[
    "cfabort",
    "cfapplication",
    "cfargument",
    "cfassociate",
    "cfbreak",
    "cfcontent",
    "cfcontinue",
    "cfcookie",
    "cfdirectory",
    "cfdump",
    "cfelse",
    "cfelseif",
    "cfexit",
    "cffile",
    "cfflush",
    "cfheader",
    "cfhttpparam",
    "cfimage",
    "cfimport",
    "cfinclude",
    "cfinvokeargument",
    "cflocation",
    "cflog",
    "cfloginuser",
    "cflogout",
    "cfmailparam",
    "cfobject",
    "cfparam",
    "cfprocparam",
    "cfprocresult",
    "cfproperty",
    "cfqueryparam",
    "cfrethrow",
    "cfreturn",
    "cfset",
    "cfsetting",
    "cfthrow",
    "cfzipparam",
];

/// Tags known to take no attributes, so attribute parsing is skipped
pub const ATTRIBUTELESS_TAGS: &[&str] = &[
    "cfbreak",
    "cfcontinue",
    "cfdefaultcase",
    "cfelse",
    "cffinally",
    "cfrethrow",
    "cfscript",
    "cfsilent",
    "cftry",
];

/// Tags whose body is raw text that must not be scanned for nested tags
const RAW_BODY_TAGS: &[&str] = &["cfscript"];

pub fn is_bodiless_tag(name: &str) -> bool {
    BODILESS_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

pub fn tag_accepts_attributes(name: &str) -> bool {
    !ATTRIBUTELESS_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// A recognised tag with its attributes and, for body tags, its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercased tag name
    pub name: String,
    pub attributes: Attributes,
    /// From `<` of the start tag to `>` of the end tag (or of the start tag)
    pub span: Span,
    /// The start tag alone
    pub start_tag_span: Span,
    /// The region between the tag name and the closing `>` of the start tag
    pub attribute_span: Span,
    pub body_span: Option<Span>,
}

static TAG_PATTERNS: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Fetch (or build and memoise) the by-name pattern for `name`
fn tag_pattern(name: &str) -> Option<Regex> {
    let key = name.to_lowercase();
    let mut patterns = TAG_PATTERNS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(pattern) = patterns.get(&key) {
        return Some(pattern.clone());
    }
    let escaped = regex::escape(&key);
    let source = format!(r"(?is)(<{escaped}\b\s*)([^>]*?)(?:>(.*?)</{escaped}\s*>|/?>)");
    match Regex::new(&source) {
        Ok(pattern) => {
            patterns.insert(key, pattern.clone());
            Some(pattern)
        }
        Err(error) => {
            tracing::warn!("Could not build tag pattern for {}: {}", name, error);
            None
        }
    }
}

/// Find every `<name ...>` tag in `span` using a generated pattern.
///
/// A body is captured up to the first following `</name>`; same-name
/// nesting is therefore not paired correctly.
pub fn scan_tags_by_name(text: &str, name: &str, span: Span) -> Vec<Tag> {
    let Some(pattern) = tag_pattern(name) else {
        return Vec::new();
    };
    let end = span.end.min(text.len());
    let Some(haystack) = text.get(span.start..end) else {
        return Vec::new();
    };
    let base = span.start;
    let accepts_attributes = tag_accepts_attributes(name);

    pattern
        .captures_iter(haystack)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let attrs = captures.get(2)?;
            let attribute_span = Span::new(base + attrs.start(), base + attrs.end());
            let body_span = captures
                .get(3)
                .map(|body| Span::new(base + body.start(), base + body.end()));
            let start_tag_end = match body_span {
                Some(body) => body.start,
                None => base + whole.end(),
            };
            let attributes = if accepts_attributes {
                parse_attributes(text, attribute_span, None)
            } else {
                Attributes::new()
            };
            Some(Tag {
                name: name.to_lowercase(),
                attributes,
                span: Span::new(base + whole.start(), base + whole.end()),
                start_tag_span: Span::new(base + whole.start(), start_tag_end),
                attribute_span,
                body_span,
            })
        })
        .collect()
}

#[derive(Debug)]
enum ScanState {
    Outside,
    InStartTag { tag_start: usize, name: String, name_end: usize },
    InEndTag { tag_start: usize, name: String },
}

#[derive(Debug)]
struct OpenTag {
    name: String,
    tag_start: usize,
    start_tag_end: usize,
    attribute_span: Span,
    attributes: Attributes,
}

/// Single-pass scan of `span` for tags whose (lowercased) name satisfies
/// `is_wanted`, pairing start and end tags with an unclosed-tag stack.
///
/// Tags left unclosed when the scan ends are dropped. Results are ordered
/// by start offset.
pub fn scan_tags(text: &str, span: Span, is_wanted: impl Fn(&str) -> bool) -> Vec<Tag> {
    scan_tags_with(text, span, is_wanted, tag_accepts_attributes)
}

/// [`scan_tags`] with a caller-supplied policy for which tags need their
/// attributes parsed.
pub fn scan_tags_with(
    text: &str,
    span: Span,
    is_wanted: impl Fn(&str) -> bool,
    accepts_attributes: impl Fn(&str) -> bool,
) -> Vec<Tag> {
    let bytes = text.as_bytes();
    let end = span.end.min(bytes.len());
    let mut state = ScanState::Outside;
    let mut strings = StringState::default();
    let mut unclosed: Vec<OpenTag> = Vec::new();
    let mut tags: Vec<Tag> = Vec::new();
    let mut idx = span.start;

    while idx < end {
        match state {
            ScanState::Outside => {
                if bytes[idx] != b'<' {
                    idx += 1;
                    continue;
                }
                if text[idx..end].starts_with("<!---") {
                    idx = tag_comment_spans(text, Span::new(idx, end))
                        .first()
                        .map_or(end, |comment| comment.end);
                    continue;
                }
                let is_end_tag = bytes.get(idx + 1) == Some(&b'/');
                let name_start = if is_end_tag { idx + 2 } else { idx + 1 };
                let name_end = read_tag_name(bytes, name_start, end);
                if name_end == name_start {
                    idx += 1;
                    continue;
                }
                let name = text[name_start..name_end].to_ascii_lowercase();
                if !is_wanted(&name) {
                    idx = name_end;
                    continue;
                }
                state = if is_end_tag {
                    ScanState::InEndTag { tag_start: idx, name }
                } else {
                    strings = StringState::default();
                    ScanState::InStartTag { tag_start: idx, name, name_end }
                };
                idx = name_end;
            }
            ScanState::InStartTag { tag_start, ref name, name_end } => {
                if strings.in_string() || bytes[idx] == b'"' || bytes[idx] == b'\'' {
                    idx += strings.advance(bytes, idx);
                    continue;
                }
                if bytes[idx] != b'>' {
                    idx += 1;
                    continue;
                }

                let self_closed = idx > name_end && bytes[idx - 1] == b'/';
                let attribute_end = if self_closed { idx - 1 } else { idx };
                let attribute_span = Span::new(name_end, attribute_end);
                let start_tag_end = idx + 1;
                let attributes = if accepts_attributes(name) {
                    parse_attributes(text, attribute_span, None)
                } else {
                    Attributes::new()
                };

                if self_closed || is_bodiless_tag(name) {
                    tags.push(Tag {
                        name: name.clone(),
                        attributes,
                        span: Span::new(tag_start, start_tag_end),
                        start_tag_span: Span::new(tag_start, start_tag_end),
                        attribute_span,
                        body_span: None,
                    });
                    idx = start_tag_end;
                } else if RAW_BODY_TAGS.contains(&name.as_str()) {
                    let close = format!("</{name}");
                    match find_ignore_case(text, start_tag_end, end, &close) {
                        Some(close_start) => {
                            let close_end = text[close_start..end]
                                .find('>')
                                .map_or(end, |rel| close_start + rel + 1);
                            tags.push(Tag {
                                name: name.clone(),
                                attributes,
                                span: Span::new(tag_start, close_end),
                                start_tag_span: Span::new(tag_start, start_tag_end),
                                attribute_span,
                                body_span: Some(Span::new(start_tag_end, close_start)),
                            });
                            idx = close_end;
                        }
                        None => idx = end,
                    }
                } else {
                    unclosed.push(OpenTag {
                        name: name.clone(),
                        tag_start,
                        start_tag_end,
                        attribute_span,
                        attributes,
                    });
                    idx = start_tag_end;
                }
                state = ScanState::Outside;
            }
            ScanState::InEndTag { tag_start, ref name } => {
                if bytes[idx] != b'>' {
                    idx += 1;
                    continue;
                }
                if let Some(position) = unclosed.iter().rposition(|open| open.name == *name) {
                    // anything opened after the matching start tag was never closed
                    unclosed.truncate(position + 1);
                    if let Some(open) = unclosed.pop() {
                        tags.push(Tag {
                            name: open.name,
                            attributes: open.attributes,
                            span: Span::new(open.tag_start, idx + 1),
                            start_tag_span: Span::new(open.tag_start, open.start_tag_end),
                            attribute_span: open.attribute_span,
                            body_span: Some(Span::new(open.start_tag_end, tag_start)),
                        });
                    }
                }
                idx += 1;
                state = ScanState::Outside;
            }
        }
    }

    tags.sort_by_key(|tag| tag.span.start);
    tags
}

fn read_tag_name(bytes: &[u8], start: usize, end: usize) -> usize {
    if start >= end || !bytes[start].is_ascii_alphabetic() {
        return start;
    }
    let mut idx = start;
    while idx < end && (bytes[idx].is_ascii_alphanumeric() || matches!(bytes[idx], b'_' | b':' | b'-' | b'.')) {
        idx += 1;
    }
    idx
}

/// Case-insensitive search for an ASCII needle in `[start, end)`
pub(crate) fn find_ignore_case(text: &str, start: usize, end: usize, needle: &str) -> Option<usize> {
    let haystack = text.as_bytes().get(start..end.min(text.len()))?;
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|rel| start + rel)
}

/// The conventional predicate for CFML tags
pub fn is_cf_tag(name: &str) -> bool {
    name.len() > 2 && name.starts_with("cf")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole(text: &str) -> Span {
        Span::new(0, text.len())
    }

    #[test]
    fn test_scan_by_name_with_and_without_body() {
        let text = r#"<cfquery name="q">SELECT 1</cfquery><cfset x = 1><cfquery name="r" />"#;
        let tags = scan_tags_by_name(text, "cfquery", whole(text));
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].attributes.value("name"), Some("q"));
        assert_eq!(tags[0].body_span.unwrap().slice(text), "SELECT 1");
        assert_eq!(tags[1].attributes.value("name"), Some("r"));
        assert!(tags[1].body_span.is_none());
    }

    #[test]
    fn test_scan_by_name_requires_word_boundary() {
        let text = r#"<cfsetting enablecfoutputonly="true"><cfset a = 1>"#;
        let tags = scan_tags_by_name(text, "cfset", whole(text));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attribute_span.slice(text), "a = 1");
    }

    #[test]
    fn test_scan_by_name_respects_span() {
        let text = r#"<cfset a = 1><cfset b = 2>"#;
        let tags = scan_tags_by_name(text, "cfset", Span::new(13, text.len()));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].span.start, 13);
    }

    #[test]
    fn test_full_scan_pairs_nested_tags() {
        let text = "<cfif a><cfif b><cfset x = 1></cfif></cfif>";
        let tags = scan_tags(text, whole(text), is_cf_tag);
        let ifs: Vec<&Tag> = tags.iter().filter(|tag| tag.name == "cfif").collect();
        assert_eq!(ifs.len(), 2);
        assert_eq!(ifs[0].span, whole(text));
        assert_eq!(ifs[1].body_span.unwrap().slice(text), "<cfset x = 1>");
        assert!(tags.iter().any(|tag| tag.name == "cfset" && tag.body_span.is_none()));
    }

    #[test]
    fn test_full_scan_ignores_gt_in_strings() {
        let text = r#"<cffunction name="f" hint="a > b"><cfargument name="x"></cffunction>"#;
        let tags = scan_tags(text, whole(text), is_cf_tag);
        let function = tags.iter().find(|tag| tag.name == "cffunction").unwrap();
        assert_eq!(function.attributes.value("hint"), Some("a > b"));
        assert_eq!(function.body_span.unwrap().slice(text), r#"<cfargument name="x">"#);
    }

    #[test]
    fn test_full_scan_handles_expressions_in_strings() {
        let text = r##"<cfoutput value="#fn(">")#"><cfset y = 2></cfoutput>"##;
        let tags = scan_tags(text, whole(text), is_cf_tag);
        assert!(tags.iter().any(|tag| tag.name == "cfoutput" && tag.body_span.is_some()));
        assert!(tags.iter().any(|tag| tag.name == "cfset"));
    }

    #[test]
    fn test_full_scan_drops_unterminated_tags() {
        let text = r#"<cfoutput><cfloop from="1" to="2" index="i">"#;
        let tags = scan_tags(text, whole(text), is_cf_tag);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_full_scan_skips_comments_and_script_bodies() {
        let text = "<!--- <cfset hidden = 1> ---><cfscript>if (a < b) { x = 1; }</cfscript><cfset shown = 1>";
        let tags = scan_tags(text, whole(text), is_cf_tag);
        let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, vec!["cfscript", "cfset"]);
        assert!(tags[1].attributes.contains("shown"));
    }

    #[test]
    fn test_explicit_self_closing() {
        let text = r#"<cfhttp url="x" result="r" /><cfoutput></cfoutput>"#;
        let tags = scan_tags(text, whole(text), is_cf_tag);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "cfhttp");
        assert_eq!(tags[0].attribute_span.slice(text).trim(), r#"url="x" result="r""#);
    }

    #[test]
    fn test_find_ignore_case() {
        assert_eq!(find_ignore_case("abc</CFSCRIPT>", 0, 14, "</cfscript"), Some(3));
        assert_eq!(find_ignore_case("abc", 0, 3, "abcd"), None);
    }
}
