//! Position-anchored queries over parsed documents: outlines and
//! go-to-definition.

use crate::cache::{EntityCache, all_functions, ancestors, find_function};
use crate::document::{Document, DocumentContext};
use crate::parser::{VariableAnalyzer, function_containing, resolve_unscoped};
use crate::text::{Span, is_identifier_byte};
use crate::types::{Component, Location, Range, Scope, UserFunction, Variable};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Component,
    Interface,
    Property,
    Function,
    Variable,
}

/// One outline entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub detail: Option<String>,
    /// The whole declaration
    pub range: Range,
    /// The name within the declaration
    pub selection_range: Range,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentSymbol>,
}

/// Where a symbol under the cursor is declared
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub name: String,
    pub kind: SymbolKind,
    pub location: Location,
}

fn function_symbol(function: &UserFunction) -> DocumentSymbol {
    let detail = function
        .active_signature()
        .map(|signature| format!("{} {}", function.return_type, signature.label(&function.name)));
    DocumentSymbol {
        name: function.name.clone(),
        kind: SymbolKind::Function,
        detail,
        range: function.location.range,
        selection_range: function.name_range,
        children: Vec::new(),
    }
}

/// Outline entries for variables, in source order
pub fn variable_symbols(variables: &[Variable]) -> Vec<DocumentSymbol> {
    let mut symbols: Vec<DocumentSymbol> = variables
        .iter()
        .map(|variable| DocumentSymbol {
            name: format!("{}.{}", variable.scope, variable.identifier),
            kind: SymbolKind::Variable,
            detail: Some(variable.data_type.to_string()),
            range: variable.declaration_location.range,
            selection_range: variable.declaration_location.range,
            children: Vec::new(),
        })
        .collect();
    symbols.sort_by_key(|symbol| symbol.range.start);
    symbols
}

/// Outline of a component: its properties, functions and body variables
/// as children of one component entry, each group in source order
pub fn document_symbols(component: &Component) -> DocumentSymbol {
    let mut properties: Vec<DocumentSymbol> = component
        .properties
        .values()
        .map(|property| DocumentSymbol {
            name: property.name.clone(),
            kind: SymbolKind::Property,
            detail: Some(property.data_type.to_string()),
            range: property.location.range,
            selection_range: property.name_range,
            children: Vec::new(),
        })
        .collect();
    properties.sort_by_key(|symbol| symbol.range.start);

    let mut functions: Vec<DocumentSymbol> = component.functions.values().map(function_symbol).collect();
    functions.sort_by_key(|symbol| symbol.range.start);

    let mut children = properties;
    children.extend(functions);
    children.extend(variable_symbols(&component.variables));

    DocumentSymbol {
        name: component.name.clone(),
        kind: if component.is_interface {
            SymbolKind::Interface
        } else {
            SymbolKind::Component
        },
        detail: component.hint.clone(),
        range: component.declaration_range,
        selection_range: component.declaration_range,
        children,
    }
}

/// The dotted token around `offset` and the segment the offset falls in
fn token_at(text: &str, offset: usize) -> Option<(Span, Span)> {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());
    let is_token_byte = |byte: u8| is_identifier_byte(byte) || byte == b'.';

    let mut start = offset;
    while start > 0 && is_token_byte(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = offset;
    while end < bytes.len() && is_token_byte(bytes[end]) {
        end += 1;
    }
    if start == end {
        return None;
    }

    let mut segment_start = offset;
    while segment_start > start && bytes[segment_start - 1] != b'.' {
        segment_start -= 1;
    }
    let mut segment_end = offset;
    while segment_end < end && bytes[segment_end] != b'.' {
        segment_end += 1;
    }
    if segment_start == segment_end {
        return None;
    }
    Some((Span::new(start, end), Span::new(segment_start, segment_end)))
}

/// Whether `new ` directly precedes `offset`
fn follows_new_keyword(text: &str, offset: usize) -> bool {
    let before = text[..offset].trim_end();
    let bytes = before.as_bytes();
    if before.len() == offset || bytes.len() < 3 {
        return false;
    }
    let keyword_start = bytes.len() - 3;
    bytes[keyword_start..].eq_ignore_ascii_case(b"new")
        && (keyword_start == 0 || !is_identifier_byte(bytes[keyword_start - 1]))
}

fn component_definition(cache: &EntityCache, dotted_path: &str, base_uri: &Path) -> Option<Definition> {
    let uri = cache.resolve_dotted_path_to_cached_uri(dotted_path, base_uri)?;
    let component = cache.get_component(&uri)?;
    Some(Definition {
        name: component.name.clone(),
        kind: if component.is_interface {
            SymbolKind::Interface
        } else {
            SymbolKind::Component
        },
        location: Location::new(uri, component.declaration_range),
    })
}

fn function_definition(function: &UserFunction) -> Definition {
    Definition {
        name: function.name.clone(),
        kind: SymbolKind::Function,
        location: Location::new(function.location.uri.clone(), function.name_range),
    }
}

fn variable_definition(variable: &Variable) -> Definition {
    Definition {
        name: variable.identifier.clone(),
        kind: SymbolKind::Variable,
        location: variable.declaration_location.clone(),
    }
}

/// Variables visible at `offset`: those of the enclosing function body
/// first, then the component body and its properties. Templates are
/// analyzed whole.
pub fn visible_variables(
    cache: &EntityCache,
    document: &Document,
    component: Option<&Component>,
    offset: usize,
) -> Vec<Variable> {
    let Some(component) = component else {
        let ctx = DocumentContext::new(document, false);
        return VariableAnalyzer::new(&ctx, cache).analyze(None);
    };

    let ctx = DocumentContext::new(document, component.is_script);
    let position = document.position_at(offset);
    let mut variables = Vec::new();

    if let Some(function) = function_containing(component.functions.values(), &Range::new(position, position)) {
        if let Some(body) = &function.body_range {
            variables = VariableAnalyzer::new(&ctx, cache)
                .with_functions(component.functions.values())
                .analyze(Some(document.span(body)));
        }
    }
    variables.extend(component.variables.iter().cloned());
    variables.extend(component.properties.values().map(|property| {
        Variable::new(
            &property.name,
            Scope::Variables,
            property.data_type,
            Location::new(property.location.uri.clone(), property.name_range),
        )
        .with_component_uri(property.data_type_component_uri.clone())
        .with_description(property.description.clone())
    }));
    variables
}

fn scoped_variable<'v>(
    cache: &'v EntityCache,
    variables: &'v [Variable],
    scope: Scope,
    identifier: &str,
) -> Option<&'v Variable> {
    match scope {
        Scope::Application => cache
            .all_application_variables()
            .flat_map(|(_, variables)| variables)
            .find(|variable| variable.matches(scope, identifier)),
        Scope::Server => cache
            .all_server_variables()
            .flat_map(|(_, variables)| variables)
            .find(|variable| variable.matches(scope, identifier)),
        _ => variables.iter().find(|variable| variable.matches(scope, identifier)),
    }
}

/// Resolve the identifier at `offset` to its declaration.
///
/// Calls resolve to functions (declared, inherited or implicit, or on a
/// variable of known component type), bare and scoped names to variables,
/// and dotted paths to cached components.
pub fn definition_at(
    cache: &EntityCache,
    document: &Document,
    component: Option<&Component>,
    offset: usize,
) -> Option<Definition> {
    let text = document.text();
    let (token, segment) = token_at(text, offset)?;
    let name = segment.slice(text);
    let qualifier = text[token.start..segment.start].trim_end_matches('.');
    let after = text[segment.end..].trim_start();
    let is_last_segment = segment.end == token.end;
    let is_call = is_last_segment && after.starts_with('(');
    if follows_new_keyword(text, token.start) {
        let dotted = Span::new(token.start, segment.end).slice(text);
        return component_definition(cache, dotted, document.uri());
    }

    let variables = visible_variables(cache, document, component, offset);

    if is_call {
        let found = match (qualifier.to_ascii_lowercase().as_str(), component) {
            ("" | "this" | "variables", Some(component)) => find_function(cache, component, name),
            ("super", Some(component)) => ancestors(cache, component)
                .first()
                .and_then(|parent| all_functions(cache, parent, true).remove(&name.to_lowercase())),
            (_, _) if !qualifier.is_empty() && !qualifier.contains('.') => {
                let owner = resolve_unscoped(&variables, qualifier)
                    .and_then(|variable| variable.data_type_component_uri.as_deref())
                    .and_then(|uri| cache.get_component(uri));
                owner.and_then(|owner| find_function(cache, owner, name))
            }
            _ => None,
        };
        if let Some(function) = found {
            return Some(function_definition(&function));
        }
    }

    let segment_is_first = qualifier.is_empty();
    if segment_is_first {
        if let Some(variable) = resolve_unscoped(&variables, name) {
            return Some(variable_definition(variable));
        }
    } else if let Some(scope) = Scope::from_prefix(qualifier) {
        if let Some(variable) = scoped_variable(cache, &variables, scope, name) {
            return Some(variable_definition(variable));
        }
    }

    let dotted = Span::new(token.start, segment.end).slice(text);
    component_definition(cache, dotted, document.uri())
}
