//! Assembles a [`Component`] from one `.cfc` document.

use super::attributes::{Attributes, parse_attributes, parse_boolean};
use super::doc_block::{DEFAULT_KEY, DocBlock, parse_doc_block};
use super::functions::parse_functions;
use super::properties::parse_properties;
use super::variables::VariableAnalyzer;
use crate::document::{Document, DocumentContext};
use crate::interfaces::ComponentLocator;
use crate::resolve::short_name_span;
use crate::text::{Span, is_in_spans, split_unescaped, tag_comment_spans};
use crate::types::{Component, ComponentReference};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_COMPONENT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<cf(?:component|interface)\b").unwrap());

static COMPONENT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*)?(?:(<cf)|\b)(component|interface)\b([^>{]*)").unwrap()
});

/// The located declaration header
struct Header {
    is_script: bool,
    is_interface: bool,
    doc: DocBlock,
    inline: Attributes,
    declaration: Span,
    /// Offset just past the `{` or `>` closing the header
    body_start: usize,
}

/// Inline attributes layered over documentation-block values
struct HeaderAttributes<'h> {
    text: &'h str,
    header: &'h Header,
}

impl HeaderAttributes<'_> {
    fn get(&self, key: &str) -> Option<(String, Option<Span>)> {
        if let Some(attribute) = self.header.inline.get(key) {
            let value = attribute.value.clone().unwrap_or_default();
            return Some((value, attribute.value_span));
        }
        self.header
            .doc
            .entry(key)
            .map(|entry| (entry.value.clone(), Some(entry.value_span)))
    }

    fn value(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|(value, _)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        if let Some(flag) = self.header.inline.flag(key) {
            return Some(flag);
        }
        self.header.doc.value(key).and_then(parse_boolean)
    }

    fn text(&self) -> &str {
        self.text
    }
}

/// Whether the document declares its component with tags
fn is_tag_dialect(text: &str) -> bool {
    let comments = tag_comment_spans(text, Span::new(0, text.len()));
    TAG_COMPONENT_OPEN
        .find_iter(text)
        .any(|found| !is_in_spans(&comments, found.start()))
}

fn find_header(ctx: &DocumentContext) -> Option<Header> {
    let text = ctx.text();
    let bytes = text.as_bytes();

    // A rejected candidate may have swallowed the real header into its
    // attribute run, so the scan resumes right after the rejected keyword.
    let mut from = 0;
    while let Some(captures) = COMPONENT_HEADER.captures_at(text, from) {
        let (Some(whole), Some(keyword), Some(attributes)) = (captures.get(0), captures.get(3), captures.get(4)) else {
            break;
        };
        from = keyword.end();

        let is_tag = captures.get(2).is_some();
        if is_tag == ctx.is_script {
            continue;
        }
        let declaration_start = captures.get(2).map_or(keyword.start(), |open| open.start());
        if ctx.is_comment(declaration_start) {
            continue;
        }

        let terminator = if is_tag { b'>' } else { b'{' };
        if bytes.get(attributes.end()) != Some(&terminator) {
            continue;
        }

        let doc = captures
            .get(1)
            .map(|doc| parse_doc_block(text, Span::new(doc.start(), doc.end())))
            .unwrap_or_default();
        let attribute_span = Span::new(attributes.start(), attributes.end());
        let inline = parse_attributes(text, attribute_span, None);
        tracing::trace!("component header at {}..{}", whole.start(), whole.end());

        return Some(Header {
            is_script: !is_tag,
            is_interface: keyword.as_str().eq_ignore_ascii_case("interface"),
            doc,
            inline,
            declaration: Span::new(declaration_start, attributes.end() + 1),
            body_start: attributes.end() + 1,
        });
    }

    None
}

fn reference(
    attributes: &HeaderAttributes,
    ctx: &DocumentContext,
    value: &str,
    span: Option<Span>,
    locator: &dyn ComponentLocator,
) -> Option<ComponentReference> {
    let uri = locator.locate(value.trim(), ctx.document.uri())?;
    let range = match span {
        Some(span) => ctx.range(short_name_span(attributes.text(), span)),
        None => Default::default(),
    };
    Some(ComponentReference { uri, range })
}

/// Parse `document` as a component or interface.
///
/// Returns `None` when no declaration header is found.
pub fn parse_component(document: &Document, locator: &dyn ComponentLocator) -> Option<Component> {
    let is_script = !is_tag_dialect(document.text());
    let ctx = DocumentContext::new(document, is_script);
    let Some(header) = find_header(&ctx) else {
        tracing::debug!("No component declaration in {}", document.uri().display());
        return None;
    };
    let text = ctx.text();
    let attributes = HeaderAttributes { text, header: &header };

    let mut component = Component {
        uri: document.uri().to_path_buf(),
        name: document.file_stem(),
        is_script: header.is_script,
        is_interface: header.is_interface,
        declaration_range: ctx.range(header.declaration),
        displayname: attributes.value("displayname"),
        hint: attributes.value(DEFAULT_KEY),
        accessors: attributes.flag("accessors").unwrap_or(false),
        initmethod: attributes.value("initmethod"),
        ..Component::default()
    };
    if attributes.flag("persistent") == Some(true) {
        component.accessors = true;
    }

    if let Some((extends, span)) = attributes.get("extends") {
        component.extends = reference(&attributes, &ctx, &extends, span, locator);
        if component.extends.is_none() {
            tracing::debug!("Unresolved extends '{}' in {}", extends.trim(), document.uri().display());
        }
    }

    if let Some((_, span)) = attributes.get("implements") {
        let references = match span {
            Some(span) => split_unescaped(text, span.start, span.end, ',')
                .into_iter()
                .filter_map(|part| {
                    let value = part.slice(text).trim();
                    if value.is_empty() {
                        return None;
                    }
                    reference(&attributes, &ctx, value, Some(part), locator)
                })
                .collect(),
            None => Vec::new(),
        };
        component.implements = Some(references);
    }

    for function in parse_functions(&ctx, header.is_interface, locator) {
        component.functions.insert(function.key(), function);
    }
    for property in parse_properties(&ctx, locator) {
        component.properties.insert(property.name.to_lowercase(), property);
    }

    let body_end = component
        .functions
        .values()
        .map(|function| document.span(&function.location.range).start)
        .filter(|start| *start >= header.body_start)
        .min()
        .unwrap_or(text.len());
    if body_end > header.body_start {
        component.variables = VariableAnalyzer::new(&ctx, locator)
            .with_functions(component.functions.values())
            .analyze(Some(Span::new(header.body_start, body_end)));
    }

    tracing::debug!(
        "Parsed component {} ({} functions, {} properties, {} variables)",
        component.name,
        component.functions.len(),
        component.properties.len(),
        component.variables.len()
    );
    Some(component)
}
