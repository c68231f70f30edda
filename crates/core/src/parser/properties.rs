//! Property declarations and the accessors they imply.

use super::attributes::{Attributes, parse_attributes, parse_boolean};
use super::doc_block::{DocBlock, parse_doc_block};
use crate::document::DocumentContext;
use crate::interfaces::ComponentLocator;
use crate::resolve::{resolve_type, short_name_span};
use crate::text::{Span, is_identifier_byte, skip_whitespace, unwrap_literal};
use crate::types::{Argument, Component, DataType, Property, Signature, UserFunction};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static SCRIPT_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*)?\bproperty\b([^;{}]*)").unwrap()
});

/// Parse property declarations: `property` statements in script
/// components, `<cfproperty>` tags otherwise.
pub fn parse_properties(ctx: &DocumentContext, locator: &dyn ComponentLocator) -> Vec<Property> {
    if ctx.is_script {
        parse_script_properties(ctx, locator)
    } else {
        parse_tag_properties(ctx, locator)
    }
}

fn parse_script_properties(ctx: &DocumentContext, locator: &dyn ComponentLocator) -> Vec<Property> {
    let text = ctx.text();
    let bytes = text.as_bytes();
    let mut properties = Vec::new();

    // rejected candidates resume right after their keyword so a commented
    // `property` cannot swallow the declaration that follows it
    let mut from = 0;
    while let Some(captures) = SCRIPT_PROPERTY.captures_at(text, from) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(2)) else {
            break;
        };
        from = body.start();
        let keyword_start = body.start() - "property".len();
        if ctx.is_comment(keyword_start) {
            continue;
        }
        // only statements: `x.property = 1` or `getProperty()` are not declarations
        let preceding = text[..keyword_start].trim_end().bytes().last();
        if preceding.is_some_and(|byte| !matches!(byte, b'{' | b'}' | b';' | b'/')) {
            continue;
        }
        if bytes.get(body.start()).is_some_and(|byte| !byte.is_ascii_whitespace()) {
            continue;
        }

        let body_span = Span::new(body.start(), body.end());
        let doc = captures
            .get(1)
            .map(|doc| parse_doc_block(text, Span::new(doc.start(), doc.end())))
            .unwrap_or_default();
        let declaration_end = if bytes.get(whole.end()) == Some(&b';') {
            whole.end() + 1
        } else {
            whole.end()
        };
        from = declaration_end;
        let declaration = PropertyDeclaration {
            span: Span::new(keyword_start, declaration_end),
            shorthand: shorthand_words(text, body_span),
            attributes: parse_attributes(text, body_span, None),
            doc,
        };
        if let Some(property) = build_property(ctx, declaration, locator) {
            properties.push(property);
        }
    }

    properties
}

fn parse_tag_properties(ctx: &DocumentContext, locator: &dyn ComponentLocator) -> Vec<Property> {
    ctx.tags_by_name("cfproperty", ctx.document.full_span())
        .into_iter()
        .filter_map(|tag| {
            let declaration = PropertyDeclaration {
                span: tag.span,
                shorthand: Vec::new(),
                attributes: tag.attributes,
                doc: DocBlock::default(),
            };
            build_property(ctx, declaration, locator)
        })
        .collect()
}

struct PropertyDeclaration {
    span: Span,
    /// Leading `[type] name` words of a script declaration
    shorthand: Vec<Span>,
    attributes: Attributes,
    doc: DocBlock,
}

/// Words at the start of `span` that are not `name=value` attributes
fn shorthand_words(text: &str, span: Span) -> Vec<Span> {
    let bytes = text.as_bytes();
    let mut words = Vec::new();
    let mut cursor = skip_whitespace(text, span.start);

    while cursor < span.end && words.len() < 2 {
        let start = cursor;
        while cursor < span.end && (is_identifier_byte(bytes[cursor]) || matches!(bytes[cursor], b'.' | b'[' | b']')) {
            cursor += 1;
        }
        if cursor == start {
            break;
        }
        let after = skip_whitespace(text, cursor);
        if bytes.get(after) == Some(&b'=') {
            break;
        }
        words.push(Span::new(start, cursor));
        cursor = after;
    }

    words
}

fn build_property(
    ctx: &DocumentContext,
    declaration: PropertyDeclaration,
    locator: &dyn ComponentLocator,
) -> Option<Property> {
    let text = ctx.text();
    let PropertyDeclaration {
        span,
        shorthand,
        attributes,
        doc,
    } = declaration;

    let (name, name_span) = match attributes.get("name") {
        Some(attr) => (attr.value.clone()?, attr.value_span?),
        None => {
            let span = *shorthand.last()?;
            (span.slice(text).to_string(), span)
        }
    };
    let name = name.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let mut property = Property {
        name,
        name_range: ctx.range(name_span),
        location: ctx.location(span),
        ..Property::default()
    };

    let mut type_source = match attributes.get("type") {
        Some(attr) => attr.value.clone().zip(attr.value_span).map(|(value, span)| (span, value)),
        None if shorthand.len() == 2 && !attributes.contains("name") => {
            Some((shorthand[0], shorthand[0].slice(text).to_string()))
        }
        None => None,
    };
    if let Some(entry) = doc.entry("type") {
        type_source = Some((entry.value_span, entry.value.clone()));
    }
    if let Some((type_span, type_string)) = type_source {
        let resolved = resolve_type(&type_string, ctx.document.uri(), locator);
        property.data_type = resolved.data_type;
        property.data_type_component_uri = resolved.component_uri;
        property.data_type_range = Some(ctx.range(short_name_span(text, type_span)));
    }

    property.description = attributes
        .value("hint")
        .or_else(|| attributes.value("displayname"))
        .or_else(|| doc.value("hint"))
        .or_else(|| doc.value("displayname"))
        .map(str::to_string);
    property.default = attributes
        .value("default")
        .or_else(|| doc.value("default"))
        .map(|value| unwrap_literal(value).to_string());
    property.getter = attributes
        .flag("getter")
        .or_else(|| doc.value("getter").and_then(parse_boolean));
    property.setter = attributes
        .flag("setter")
        .or_else(|| doc.value("setter").and_then(parse_boolean));

    Some(property)
}

/// `name` → `Name`
fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Synthesize getters and setters for the properties of `chain`, which
/// lists a component followed by its ancestors, nearest first.
///
/// Only components with accessors enabled contribute. A function declared
/// anywhere from the start of the chain up to the contributing level
/// suppresses the accessor, and nearer synthesis beats farther.
pub fn implicit_accessors(chain: &[&Component]) -> BTreeMap<String, UserFunction> {
    let mut accessors: BTreeMap<String, UserFunction> = BTreeMap::new();

    for (level, owner) in chain.iter().enumerate() {
        if !owner.accessors {
            continue;
        }
        let declared_nearer = |name: &str| chain[..=level].iter().any(|component| component.has_function(name));

        for property in owner.properties.values() {
            let pascal = pascal_case(&property.name);

            if property.has_getter() {
                let name = format!("get{pascal}");
                let key = name.to_lowercase();
                if !declared_nearer(&name) && !accessors.contains_key(&key) {
                    accessors.insert(key, getter(property, name));
                }
            }
            if property.has_setter() {
                let name = format!("set{pascal}");
                let key = name.to_lowercase();
                if !declared_nearer(&name) && !accessors.contains_key(&key) {
                    accessors.insert(key, setter(owner, property, name));
                }
            }
        }
    }

    accessors
}

fn getter(property: &Property, name: String) -> UserFunction {
    UserFunction {
        name,
        description: property.description.clone(),
        return_type: property.data_type,
        return_type_component_uri: property.data_type_component_uri.clone(),
        name_range: property.name_range,
        signatures: vec![Signature::default()],
        location: property.location.clone(),
        body_range: None,
        is_implicit: true,
        ..UserFunction::default()
    }
}

fn setter(owner: &Component, property: &Property, name: String) -> UserFunction {
    let argument = Argument {
        name: property.name.clone(),
        data_type: property.data_type,
        data_type_component_uri: property.data_type_component_uri.clone(),
        required: true,
        description: property.description.clone(),
        name_range: property.name_range,
        ..Argument::default()
    };
    UserFunction {
        name,
        description: property.description.clone(),
        return_type: DataType::Component,
        return_type_component_uri: Some(owner.uri.clone()),
        name_range: property.name_range,
        signatures: vec![Signature::new(vec![argument])],
        location: property.location.clone(),
        body_range: None,
        is_implicit: true,
        ..UserFunction::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::interfaces::NoopLocator;
    use crate::types::{Access, Location};
    use std::path::PathBuf;

    fn script(text: &str) -> Vec<Property> {
        let document = Document::new("/project/User.cfc", text);
        let ctx = DocumentContext::new(&document, true);
        parse_properties(&ctx, &NoopLocator)
    }

    #[test]
    fn test_script_forms() {
        let properties = script(
            r#"component accessors="true" {
    property name="email" type="string" default="'none'";
    property numeric age;
    property nickname;
    /** Shown on screen
      * @type numeric */
    property string rank getter=false;
    // property string ignored;
    variables.property = 1;
}"#,
        );
        let names: Vec<_> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["email", "age", "nickname", "rank"]);

        assert_eq!(properties[0].data_type, DataType::String);
        assert_eq!(properties[0].default.as_deref(), Some("none"));
        assert_eq!(properties[1].data_type, DataType::Numeric);
        assert_eq!(properties[2].data_type, DataType::Any);
        assert_eq!(properties[3].data_type, DataType::Numeric);
        assert_eq!(properties[3].description.as_deref(), Some("Shown on screen"));
        assert_eq!(properties[3].getter, Some(false));
        assert_eq!(properties[3].setter, None);
    }

    #[test]
    fn test_property_after_line_comment() {
        let properties = script("component accessors=\"true\" {\n // the email property\n property name=\"email\";\n}");
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name, "email");

        let properties = script("component {\n /* legacy property */ property numeric age;\n}");
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name, "age");
        assert_eq!(properties[0].data_type, DataType::Numeric);
    }

    #[test]
    fn test_tag_properties() {
        let text = "<cfcomponent accessors=\"true\">\n<cfproperty name=\"id\" type=\"numeric\" setter=\"no\">\n<!--- <cfproperty name=\"ghost\"> --->\n<cfproperty type=\"string\">\n</cfcomponent>";
        let document = Document::new("/project/User.cfc", text);
        let ctx = DocumentContext::new(&document, false);
        let properties = parse_properties(&ctx, &NoopLocator);

        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name, "id");
        assert_eq!(properties[0].setter, Some(false));
        let span = document.span(&properties[0].name_range);
        assert_eq!(span.slice(text), "id");
    }

    fn component(uri: &str, accessors: bool, properties: &[&str], functions: &[&str]) -> Component {
        let mut component = Component {
            uri: PathBuf::from(uri),
            accessors,
            ..Component::default()
        };
        for name in properties {
            component.properties.insert(
                name.to_lowercase(),
                Property {
                    name: name.to_string(),
                    data_type: DataType::String,
                    location: Location::new(uri, Default::default()),
                    ..Property::default()
                },
            );
        }
        for name in functions {
            component.functions.insert(
                name.to_lowercase(),
                UserFunction {
                    name: name.to_string(),
                    ..UserFunction::default()
                },
            );
        }
        component
    }

    #[test]
    fn test_accessors_for_unflagged_property() {
        let user = component("/p/User.cfc", true, &["name"], &[]);
        let accessors = implicit_accessors(&[&user]);

        let getter = &accessors["getname"];
        assert_eq!(getter.name, "getName");
        assert!(getter.is_implicit);
        assert_eq!(getter.access, Access::Public);
        assert_eq!(getter.return_type, DataType::String);
        assert!(getter.signatures[0].parameters.is_empty());

        let setter = &accessors["setname"];
        assert_eq!(setter.return_type, DataType::Component);
        assert_eq!(setter.return_type_component_uri, Some(PathBuf::from("/p/User.cfc")));
        assert_eq!(setter.signatures[0].parameters[0].name, "name");
        assert!(setter.signatures[0].parameters[0].required);
        assert!(!user.has_function("getName"));
    }

    #[test]
    fn test_accessors_respect_flags_and_declarations() {
        let mut user = component("/p/User.cfc", true, &["name", "age"], &["getAge"]);
        if let Some(name) = user.properties.get_mut("name") {
            name.setter = Some(false);
        }
        let accessors = implicit_accessors(&[&user]);
        let names: Vec<_> = accessors.values().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["getName", "setAge"]);

        let disabled = component("/p/Plain.cfc", false, &["name"], &[]);
        assert!(implicit_accessors(&[&disabled]).is_empty());
    }

    #[test]
    fn test_inherited_accessors_nearest_first() {
        let child = component("/p/Child.cfc", true, &["name"], &["getTitle"]);
        let parent = component("/p/Parent.cfc", true, &["name", "title"], &[]);
        let accessors = implicit_accessors(&[&child, &parent]);

        assert_eq!(accessors["setname"].return_type_component_uri, Some(PathBuf::from("/p/Child.cfc")));
        assert!(!accessors.contains_key("gettitle"));
        assert_eq!(accessors["settitle"].return_type_component_uri, Some(PathBuf::from("/p/Parent.cfc")));
    }
}
