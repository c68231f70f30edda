//! Function and argument declarations in both dialects.
//!
//! Script declarations (`public string function greet(required string name) {}`)
//! are found with a pattern over the script regions of a document; tag
//! declarations (`<cffunction>` with nested `<cfargument>`) come from the
//! tag scanner.

use super::attributes::{Attributes, parse_attributes, parse_boolean};
use super::doc_block::{DocBlock, parse_doc_block};
use super::tags::{Tag, scan_tags};
use crate::document::DocumentContext;
use crate::interfaces::ComponentLocator;
use crate::resolve::{ResolvedType, resolve_type, short_name_span};
use crate::text::scan::StringState;
use crate::text::{Span, find_matching_close, is_identifier_byte, skip_whitespace, split_unescaped, unwrap_literal};
use crate::types::{Access, Argument, Range, Signature, UserFunction};
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(?:/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*)?",
        r"(?:\b(private|package|public|remote|static|final|abstract|default)\s+)?",
        r"(?:\b(private|package|public|remote|static|final|abstract|default)\s+)?",
        r"(?:\b([A-Za-z0-9_.$]+)\s+)?",
        r"\bfunction\s+([_$a-zA-Z][$\w]*)\s*\(",
    ))
    .unwrap()
});

/// Words that may precede `function` without being a return type
const NON_TYPE_WORDS: &[&str] = &["return", "var", "new", "else", "do"];

/// Parse every function declared in the document: script declarations
/// first, then tag declarations.
pub fn parse_functions(
    ctx: &DocumentContext,
    is_interface: bool,
    locator: &dyn ComponentLocator,
) -> Vec<UserFunction> {
    let mut functions = parse_script_functions(ctx, is_interface, locator);
    if !ctx.is_script {
        functions.extend(parse_tag_functions(ctx, is_interface, locator));
    }
    functions
}

/// Declarations written in script syntax
pub fn parse_script_functions(
    ctx: &DocumentContext,
    is_interface: bool,
    locator: &dyn ComponentLocator,
) -> Vec<UserFunction> {
    let text = ctx.text();
    let mut functions = Vec::new();

    for region in ctx.script_spans() {
        let Some(haystack) = text.get(region.start..region.end) else {
            continue;
        };
        for captures in SCRIPT_FUNCTION.captures_iter(haystack) {
            let at = |index: usize| {
                captures
                    .get(index)
                    .map(|m| Span::new(region.start + m.start(), region.start + m.end()))
            };
            let Some(name_span) = at(5) else {
                continue;
            };
            let declaration_start = [at(2), at(3), at(4)]
                .into_iter()
                .flatten()
                .map(|span| span.start)
                .next()
                .unwrap_or_else(|| keyword_start(text, name_span.start));
            if ctx.is_comment(declaration_start) {
                continue;
            }

            let mut return_type_span = at(4);
            if return_type_span.is_some_and(|span| is_non_type_word(span.slice(text))) {
                return_type_span = None;
            }

            let declaration = ScriptDeclaration {
                doc_span: at(1),
                modifiers: [at(2), at(3)].into_iter().flatten().collect(),
                return_type_span,
                name_span,
                declaration_start,
                // the pattern ends on the opening parenthesis
                open_paren: region.start + captures.get(0).map_or(0, |m| m.end()) - 1,
                region_end: region.end,
            };
            if let Some(function) = build_script_function(ctx, &declaration, is_interface, locator) {
                functions.push(function);
            }
        }
    }

    functions
}

struct ScriptDeclaration {
    doc_span: Option<Span>,
    modifiers: Vec<Span>,
    return_type_span: Option<Span>,
    name_span: Span,
    declaration_start: usize,
    open_paren: usize,
    region_end: usize,
}

fn build_script_function(
    ctx: &DocumentContext,
    declaration: &ScriptDeclaration,
    is_interface: bool,
    locator: &dyn ComponentLocator,
) -> Option<UserFunction> {
    let text = ctx.text();
    let uri = ctx.document.uri();
    let name = declaration.name_span.slice(text).to_string();

    let Some(close_paren) = find_matching_close(text, declaration.open_paren, '(', ')')
        .filter(|close| *close < declaration.region_end)
    else {
        tracing::debug!("Unterminated argument list for function {}", name);
        return None;
    };

    let doc = declaration
        .doc_span
        .map(|span| parse_doc_block(text, span))
        .unwrap_or_default();

    // inline metadata sits between the argument list and the body
    let signature_end = close_paren + 1;
    let body_open = find_body_open(text, signature_end, declaration.region_end);
    let metadata_end = match body_open {
        BodyStart::Brace(offset) | BodyStart::Semicolon(offset) => offset,
        BodyStart::Missing => declaration.region_end,
    };
    let attributes = parse_attributes(text, Span::new(signature_end, metadata_end), None);

    let mut function = UserFunction {
        name,
        location: ctx.location(Span::new(declaration.declaration_start, signature_end)),
        name_range: ctx.range(declaration.name_span),
        ..UserFunction::default()
    };

    for modifier in &declaration.modifiers {
        apply_modifier(&mut function, modifier.slice(text));
    }
    if declaration.modifiers.iter().all(|m| Access::from_keyword(m.slice(text)).is_none()) {
        if let Some(access) = attributes
            .value("access")
            .or_else(|| doc.value("access"))
            .and_then(Access::from_keyword)
        {
            function.access = access;
        }
    }

    function.description = function_description(&attributes, &doc);

    let return_type = match declaration.return_type_span {
        Some(span) => Some((span, span.slice(text).to_string())),
        None => attributes
            .get("returntype")
            .and_then(|attr| Some((attr.value_span?, attr.value.clone()?)))
            .or_else(|| {
                doc.entry("returntype")
                    .or_else(|| doc.entry("return"))
                    .map(|entry| (entry.value_span, entry.value.clone()))
            }),
    };
    if let Some((span, type_string)) = return_type {
        let resolved = resolve_type(&type_string, uri, locator);
        function.return_type = resolved.data_type;
        function.return_type_component_uri = resolved.component_uri;
        function.return_type_range = Some(ctx.range(short_name_span(text, span)));
    }

    let parameters = split_unescaped(text, declaration.open_paren + 1, close_paren, ',')
        .into_iter()
        .filter_map(|span| parse_script_argument(ctx, span, &doc, locator))
        .collect();
    function.signatures = vec![Signature::new(parameters)];

    let body_end = match body_open {
        BodyStart::Brace(open) if !is_interface => {
            let close = find_matching_close(text, open, '{', '}')
                .filter(|close| *close < declaration.region_end)
                .map_or(declaration.region_end, |close| close + 1);
            function.body_range = Some(ctx.range(Span::new(open, close)));
            close
        }
        BodyStart::Semicolon(offset) => {
            function.body_range = Some(ctx.range(Span::new(signature_end, signature_end)));
            offset + 1
        }
        _ => {
            function.body_range = Some(ctx.range(Span::new(signature_end, signature_end)));
            signature_end
        }
    };
    function.location = ctx.location(Span::new(declaration.declaration_start, body_end));

    Some(function)
}

#[derive(Debug, Clone, Copy)]
enum BodyStart {
    Brace(usize),
    Semicolon(usize),
    Missing,
}

/// Find the `{` opening a function body, or the `;` ending a bodiless
/// declaration, skipping over quoted metadata values.
fn find_body_open(text: &str, start: usize, end: usize) -> BodyStart {
    let bytes = text.as_bytes();
    let mut strings = StringState::default();
    let mut idx = start;
    while idx < end.min(bytes.len()) {
        let byte = bytes[idx];
        if strings.in_string() || byte == b'"' || byte == b'\'' {
            idx += strings.advance(bytes, idx);
            continue;
        }
        match byte {
            b'{' => return BodyStart::Brace(idx),
            b';' => return BodyStart::Semicolon(idx),
            _ => idx += 1,
        }
    }
    BodyStart::Missing
}

fn apply_modifier(function: &mut UserFunction, modifier: &str) {
    if let Some(access) = Access::from_keyword(modifier) {
        function.access = access;
        return;
    }
    match modifier.to_ascii_lowercase().as_str() {
        "static" => function.is_static = true,
        "final" => function.is_final = true,
        "abstract" => function.is_abstract = true,
        _ => {}
    }
}

fn function_description(attributes: &Attributes, doc: &DocBlock) -> Option<String> {
    attributes
        .value("hint")
        .or_else(|| attributes.value("description"))
        .or_else(|| doc.value("hint"))
        .or_else(|| doc.value("description"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn is_non_type_word(word: &str) -> bool {
    NON_TYPE_WORDS.iter().any(|candidate| candidate.eq_ignore_ascii_case(word))
}

/// Start of the `function` keyword preceding the name at `name_start`
fn keyword_start(text: &str, name_start: usize) -> usize {
    let before = text[..name_start].trim_end();
    before.len().saturating_sub("function".len())
}

/// Parse one script argument: `[required] [type] name[=default] [attr=value ...]`
fn parse_script_argument(
    ctx: &DocumentContext,
    span: Span,
    doc: &DocBlock,
    locator: &dyn ComponentLocator,
) -> Option<Argument> {
    let text = ctx.text();
    let bytes = text.as_bytes();
    let end = span.end;
    let mut cursor = skip_whitespace(text, span.start).min(end);

    let mut required = false;
    let first = read_word(bytes, cursor, end);
    if first.slice(text).eq_ignore_ascii_case("required")
        && bytes.get(first.end).is_some_and(|byte| byte.is_ascii_whitespace())
    {
        required = true;
        cursor = skip_whitespace(text, first.end).min(end);
    }

    let word = read_word(bytes, cursor, end);
    if word.is_empty() {
        return None;
    }
    let after_word = skip_whitespace(text, word.end).min(end);

    let mut type_span = None;
    let mut name_span = word;
    if bytes.get(after_word) != Some(&b'=') {
        let second = read_word(bytes, after_word, end);
        if !second.is_empty() {
            type_span = Some(word);
            name_span = second;
        }
    }
    if !name_span.slice(text).bytes().next().is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b == b'$') {
        return None;
    }

    cursor = skip_whitespace(text, name_span.end).min(end);
    let mut default = None;
    if bytes.get(cursor) == Some(&b'=') && cursor < end {
        let value_start = skip_whitespace(text, cursor + 1).min(end);
        let value_end = default_value_end(text, value_start, end);
        default = Some(unwrap_literal(&text[value_start..value_end]).to_string());
        cursor = value_end;
    }
    let attributes = parse_attributes(text, Span::new(cursor, end), None);

    let name = name_span.slice(text).to_string();
    let mut argument = Argument {
        name: name.clone(),
        required,
        default,
        name_range: ctx.range(name_span),
        ..Argument::default()
    };

    // syntax, then doc block, then inline attributes
    let mut type_source: Option<(Span, String)> = type_span.map(|span| (span, span.slice(text).to_string()));
    if let Some(entry) = doc.sub_entry(&name, "type") {
        type_source = Some((entry.value_span, entry.value.clone()));
    }
    if let Some(required) = doc.sub_entry(&name, "required").and_then(|e| parse_boolean(&e.value)) {
        argument.required = required;
    }
    if let Some(entry) = doc.sub_entry(&name, "default") {
        argument.default = Some(unwrap_literal(&entry.value).to_string());
    }
    argument.description = doc
        .sub_entry(&name, "hint")
        .or_else(|| doc.entry(&name))
        .map(|entry| entry.value.clone());

    if let Some(attr) = attributes.get("type") {
        if let (Some(value_span), Some(value)) = (attr.value_span, attr.value.clone()) {
            type_source = Some((value_span, value));
        }
    }
    if let Some(required) = attributes.flag("required") {
        argument.required = required;
    }
    if let Some(value) = attributes.value("default") {
        argument.default = Some(unwrap_literal(value).to_string());
    }
    if let Some(value) = attributes.value("hint").or_else(|| attributes.value("displayname")) {
        argument.description = Some(value.to_string());
    }

    if let Some((span, type_string)) = type_source {
        let resolved = resolve_type(&type_string, ctx.document.uri(), locator);
        argument.data_type = resolved.data_type;
        argument.data_type_component_uri = resolved.component_uri;
        argument.data_type_range = Some(ctx.range(short_name_span(text, span)));
    }

    Some(argument)
}

/// An identifier or dotted type name starting at `start`
fn read_word(bytes: &[u8], start: usize, end: usize) -> Span {
    let mut idx = start;
    while idx < end && (is_identifier_byte(bytes[idx]) || bytes[idx] == b'.' || bytes[idx] == b'[' || bytes[idx] == b']')
    {
        idx += 1;
    }
    Span::new(start, idx)
}

/// End of a default value expression: the argument end, or the start of
/// the first trailing `attr=value` pair.
fn default_value_end(text: &str, start: usize, end: usize) -> usize {
    let bytes = text.as_bytes();
    let mut strings = StringState::default();
    let mut depth = 0usize;
    let mut idx = start;

    while idx < end {
        let byte = bytes[idx];
        if strings.in_string() || byte == b'"' || byte == b'\'' {
            idx += strings.advance(bytes, idx);
            continue;
        }
        match byte {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ if byte.is_ascii_whitespace() && depth == 0 && starts_attribute(bytes, idx, end) => {
                return idx;
            }
            _ => {}
        }
        idx += 1;
    }

    let mut trimmed = end;
    while trimmed > start && bytes[trimmed - 1].is_ascii_whitespace() {
        trimmed -= 1;
    }
    trimmed
}

/// Whether whitespace at `idx` is followed by `name=` (but not `==`)
fn starts_attribute(bytes: &[u8], idx: usize, end: usize) -> bool {
    let mut cursor = idx;
    while cursor < end && bytes[cursor].is_ascii_whitespace() {
        cursor += 1;
    }
    let name_start = cursor;
    while cursor < end && is_identifier_byte(bytes[cursor]) {
        cursor += 1;
    }
    if cursor == name_start {
        return false;
    }
    while cursor < end && bytes[cursor].is_ascii_whitespace() {
        cursor += 1;
    }
    bytes.get(cursor) == Some(&b'=') && bytes.get(cursor + 1) != Some(&b'=')
}

/// `<cffunction>` declarations with their `<cfargument>` tags
pub fn parse_tag_functions(
    ctx: &DocumentContext,
    is_interface: bool,
    locator: &dyn ComponentLocator,
) -> Vec<UserFunction> {
    let text = ctx.text();
    scan_tags(text, ctx.document.full_span(), |name| name == "cffunction")
        .into_iter()
        .filter(|tag| !ctx.is_comment(tag.span.start))
        .filter_map(|tag| build_tag_function(ctx, &tag, is_interface, locator))
        .collect()
}

fn build_tag_function(
    ctx: &DocumentContext,
    tag: &Tag,
    is_interface: bool,
    locator: &dyn ComponentLocator,
) -> Option<UserFunction> {
    let text = ctx.text();
    let uri = ctx.document.uri();
    let name_attr = tag.attributes.get("name")?;
    let name = name_attr.value.as_deref()?.trim().to_string();
    let name_span = name_attr.value_span?;
    if name.is_empty() {
        return None;
    }

    let mut function = UserFunction {
        name,
        name_range: ctx.range(name_span),
        location: ctx.location(tag.span),
        description: function_description(&tag.attributes, &DocBlock::default()),
        ..UserFunction::default()
    };
    if let Some(access) = tag.attributes.value("access").and_then(Access::from_keyword) {
        function.access = access;
    }
    for (flag, target) in [
        ("static", &mut function.is_static),
        ("final", &mut function.is_final),
        ("abstract", &mut function.is_abstract),
    ] {
        *target = tag.attributes.flag(flag).unwrap_or(false);
    }

    if let Some(attr) = tag.attributes.get("returntype") {
        if let (Some(value), Some(value_span)) = (attr.value.as_deref(), attr.value_span) {
            let resolved = resolve_type(value, uri, locator);
            function.return_type = resolved.data_type;
            function.return_type_component_uri = resolved.component_uri;
            function.return_type_range = Some(ctx.range(short_name_span(text, value_span)));
        }
    }

    let parameters = match tag.body_span {
        Some(body) => ctx
            .tags_by_name("cfargument", body)
            .iter()
            .filter_map(|argument| build_tag_argument(ctx, argument, locator))
            .collect(),
        None => Vec::new(),
    };
    function.signatures = vec![Signature::new(parameters)];

    let signature_end = tag.start_tag_span.end;
    function.body_range = match tag.body_span {
        Some(body) if !is_interface => Some(ctx.range(body)),
        _ => Some(ctx.range(Span::new(signature_end, signature_end))),
    };

    Some(function)
}

fn build_tag_argument(ctx: &DocumentContext, tag: &Tag, locator: &dyn ComponentLocator) -> Option<Argument> {
    let text = ctx.text();
    let name_attr = tag.attributes.get("name")?;
    let name = name_attr.value.as_deref()?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let mut argument = Argument {
        name,
        required: tag.attributes.flag("required").unwrap_or(false),
        default: tag
            .attributes
            .value("default")
            .map(|value| unwrap_literal(value).to_string()),
        description: tag
            .attributes
            .value("hint")
            .or_else(|| tag.attributes.value("displayname"))
            .map(str::to_string),
        name_range: ctx.range(name_attr.value_span?),
        ..Argument::default()
    };

    if let Some(attr) = tag.attributes.get("type") {
        if let (Some(value), Some(value_span)) = (attr.value.as_deref(), attr.value_span) {
            let ResolvedType {
                data_type,
                component_uri,
            } = resolve_type(value, ctx.document.uri(), locator);
            argument.data_type = data_type;
            argument.data_type_component_uri = component_uri;
            argument.data_type_range = Some(ctx.range(short_name_span(text, value_span)));
        }
    }

    Some(argument)
}

/// The function whose body contains `range`, if any
pub fn function_containing<'a>(
    functions: impl IntoIterator<Item = &'a UserFunction>,
    range: &Range,
) -> Option<&'a UserFunction> {
    functions.into_iter().find(|function| {
        function
            .body_range
            .as_ref()
            .is_some_and(|body| !body.is_empty() && body.contains_range(range))
    })
}
