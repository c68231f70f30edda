//! Variable declarations and the scopes they land in.
//!
//! Declarations are collected per category in a fixed order: function
//! arguments, `param` declarations, assignments, variables written by
//! tags, then `for ... in` loop variables. Within one analysis the first
//! declaration of a scope and identifier wins.

use super::attributes::{Attributes, parse_attributes};
use super::query::select_column_names;
use super::tags::{Tag, scan_tags};
use crate::document::DocumentContext;
use crate::interfaces::ComponentLocator;
use crate::resolve::{ResolvedType, infer_type_from_value, resolve_type};
use crate::text::scan::StringState;
use crate::text::{Span, find_matching_close, is_identifier_byte, skip_whitespace, unwrap_literal};
use crate::types::{DataType, SCOPE_PREFIXES, SCOPE_RESOLUTION_PRECEDENCE, Scope, UserFunction, Variable};
use once_cell::sync::Lazy;
use regex::Regex;

/// An attribute through which a tag writes a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputAttribute {
    pub attribute: &'static str,
    pub data_type: DataType,
}

const fn output(attribute: &'static str, data_type: DataType) -> OutputAttribute {
    OutputAttribute { attribute, data_type }
}

/// Tags that create a variable named by one of their attributes
pub const OUTPUT_VARIABLE_TAGS: &[(&str, &[OutputAttribute])] = &[
    ("cfchart", &[output("name", DataType::Binary)]),
    ("cfcollection", &[output("name", DataType::Query)]),
    ("cfdbinfo", &[output("name", DataType::Any)]),
    ("cfdirectory", &[output("name", DataType::Query)]),
    ("cfdocument", &[output("name", DataType::Binary)]),
    ("cfexecute", &[output("variable", DataType::String)]),
    ("cffeed", &[output("name", DataType::Struct), output("query", DataType::Query)]),
    ("cffile", &[output("result", DataType::Struct), output("variable", DataType::Any)]),
    ("cfftp", &[output("name", DataType::Query), output("result", DataType::Struct)]),
    ("cfhtmltopdf", &[output("name", DataType::Binary)]),
    ("cfhttp", &[output("name", DataType::Query), output("result", DataType::Struct)]),
    ("cfimage", &[output("name", DataType::Any)]),
    ("cfimap", &[output("name", DataType::Query)]),
    ("cfinvoke", &[output("returnvariable", DataType::Any)]),
    ("cfldap", &[output("name", DataType::Query)]),
    ("cfloop", &[output("index", DataType::Any), output("item", DataType::Any)]),
    ("cfntauthenticate", &[output("result", DataType::Any)]),
    ("cfobject", &[output("name", DataType::Component)]),
    ("cfpdf", &[output("name", DataType::Binary)]),
    ("cfpdfform", &[output("result", DataType::Struct)]),
    ("cfpop", &[output("name", DataType::Query)]),
    ("cfprocparam", &[output("variable", DataType::Any)]),
    ("cfprocresult", &[output("name", DataType::Query)]),
    ("cfquery", &[output("name", DataType::Query), output("result", DataType::Struct)]),
    ("cfregistry", &[output("name", DataType::Query), output("variable", DataType::Any)]),
    ("cfreport", &[output("name", DataType::Any)]),
    ("cfsavecontent", &[output("variable", DataType::String)]),
    ("cfsearch", &[output("name", DataType::Query)]),
    ("cfsharepoint", &[output("name", DataType::Any)]),
    ("cfspreadsheet", &[output("name", DataType::Any), output("query", DataType::Query)]),
    ("cfstoredproc", &[output("result", DataType::Struct)]),
    ("cfwddx", &[output("output", DataType::Any)]),
    ("cfxml", &[output("variable", DataType::Xml)]),
    ("cfzip", &[output("name", DataType::Query), output("variable", DataType::Any)]),
];

/// Output attributes of `tag_name`, if it writes variables
pub fn output_attributes(tag_name: &str) -> Option<&'static [OutputAttribute]> {
    OUTPUT_VARIABLE_TAGS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tag_name))
        .map(|(_, attributes)| *attributes)
}

fn scope_alternation() -> String {
    SCOPE_PREFIXES.join("|")
}

/// `[var] [scope.]name = value` after a statement boundary
static SCRIPT_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?im)(?:^|[;{{}}]|\bfor\s*\()\s*(var\s+)?(?:({})\s*(?:\.\s*|\[\s*['"]))?([a-zA-Z_$][$\w]*)\s*(?:['"]\s*\])?\s*=\s*([^=][^;\n]*)"#,
        scope_alternation()
    ))
    .unwrap()
});

/// The same statement as the whole content of a `<cfset>` tag
static TAG_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?is)^\s*(var\s+)?(?:({})\s*(?:\.\s*|\[\s*['"]))?([a-zA-Z_$][$\w]*)\s*(?:['"]\s*\])?\s*=\s*([^=].*)"#,
        scope_alternation()
    ))
    .unwrap()
});

static SCRIPT_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)(?:^|[;{}])\s*param\s+([^;]+)").unwrap());

static FOR_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bfor\s*\(\s*(var\s+)?(?:({})\s*\.\s*)?([a-zA-Z_$][$\w]*)\s+in\s+",
        scope_alternation()
    ))
    .unwrap()
});

/// Tag calls in script syntax: `cfhttp(url="...", result="response");`
static SCRIPT_TAG_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(cf[a-z]+)\s*\(").unwrap());

/// Collects variables from one document
pub struct VariableAnalyzer<'a, 'd> {
    ctx: &'a DocumentContext<'d>,
    locator: &'a dyn ComponentLocator,
    functions: Vec<&'a UserFunction>,
}

impl<'a, 'd> VariableAnalyzer<'a, 'd> {
    pub fn new(ctx: &'a DocumentContext<'d>, locator: &'a dyn ComponentLocator) -> Self {
        Self {
            ctx,
            locator,
            functions: Vec::new(),
        }
    }

    /// Functions of the component being analyzed; their arguments become
    /// `arguments` variables when the analyzed span lies in their body
    pub fn with_functions(mut self, functions: impl IntoIterator<Item = &'a UserFunction>) -> Self {
        self.functions = functions.into_iter().collect();
        self
    }

    /// Analyze `span` (the whole document when `None`) in the document's
    /// own dialect
    pub fn analyze(&self, span: Option<Span>) -> Vec<Variable> {
        self.analyze_as(self.ctx.is_script, span)
    }

    /// Analyze `span` as script (`true`) or tag (`false`) source
    pub fn analyze_as(&self, is_script: bool, span: Option<Span>) -> Vec<Variable> {
        let span = span.unwrap_or_else(|| self.ctx.document.full_span());
        let mut variables = Vec::new();

        for variable in self.argument_variables(span) {
            insert_variable(&mut variables, variable);
        }
        for variable in self.collect(is_script, span) {
            insert_variable(&mut variables, variable);
        }

        if !is_script {
            for script in self.ctx.embedded_script_spans() {
                let start = script.start.max(span.start);
                let end = script.end.min(span.end);
                if start >= end {
                    continue;
                }
                for variable in self.collect(true, Span::new(start, end)) {
                    insert_variable(&mut variables, variable);
                }
            }
        }

        resolve_unknown_scopes(variables)
    }

    /// Arguments of every function whose body contains `span`
    fn argument_variables(&self, span: Span) -> Vec<Variable> {
        if self.functions.is_empty() {
            return Vec::new();
        }
        let range = self.ctx.range(span);
        let uri = self.ctx.document.uri();

        self.functions
            .iter()
            .filter(|function| {
                function
                    .body_range
                    .as_ref()
                    .is_some_and(|body| !body.is_empty() && body.contains_range(&range))
            })
            .filter_map(|function| function.active_signature())
            .flat_map(|signature| signature.parameters.iter())
            .map(|argument| {
                let location = crate::types::Location::new(uri, argument.name_range);
                Variable::new(&argument.name, Scope::Arguments, argument.data_type, location)
                    .with_component_uri(argument.data_type_component_uri.clone())
                    .with_description(argument.description.clone())
                    .with_initial_value(argument.default.clone())
            })
            .collect()
    }

    /// Categories b through e, each in source order
    fn collect(&self, is_script: bool, span: Span) -> Vec<Variable> {
        let mut variables = Vec::new();
        if is_script {
            variables.extend(self.script_params(span));
            variables.extend(self.script_assignments(span));
            variables.extend(self.script_tag_calls(span));
            variables.extend(self.for_in_variables(span));
        } else {
            // cfscript is scanned only so its raw body is skipped
            let tags: Vec<Tag> = scan_tags(self.ctx.text(), span, |name| {
                matches!(name, "cfset" | "cfparam" | "cfscript") || output_attributes(name).is_some()
            })
            .into_iter()
            .filter(|tag| !self.ctx.is_comment(tag.span.start))
            .collect();

            variables.extend(tags.iter().filter(|tag| tag.name == "cfparam").filter_map(|tag| {
                self.param_from_attributes(&tag.attributes)
            }));
            variables.extend(tags.iter().filter(|tag| tag.name == "cfset").filter_map(|tag| {
                self.assignment(&TAG_ASSIGNMENT, tag.attribute_span)
            }));
            for tag in tags.iter().filter(|tag| tag.name != "cfset" && tag.name != "cfparam") {
                variables.extend(self.output_variables(&tag.name, &tag.attributes, tag.body_span));
            }
        }
        variables
    }

    fn script_params(&self, span: Span) -> Vec<Variable> {
        let text = self.ctx.text();
        let Some(haystack) = text.get(span.start..span.end) else {
            return Vec::new();
        };

        SCRIPT_PARAM
            .captures_iter(haystack)
            .filter_map(|captures| {
                let body = captures.get(1)?;
                let body = Span::new(span.start + body.start(), span.start + body.end());
                if self.ctx.is_comment(body.start) {
                    return None;
                }
                let attributes = parse_attributes(text, body, None);
                if attributes.contains("name") {
                    self.param_from_attributes(&attributes)
                } else {
                    self.shorthand_param(body)
                }
            })
            .collect()
    }

    /// `param [type] [scope.]name [= default];`
    fn shorthand_param(&self, body: Span) -> Option<Variable> {
        let text = self.ctx.text();
        let bytes = text.as_bytes();
        let first = read_name(bytes, skip_whitespace(text, body.start), body.end);
        if first.is_empty() {
            return None;
        }
        let after_first = skip_whitespace(text, first.end);
        let (type_span, name_span) = if bytes.get(after_first) != Some(&b'=') {
            let second = read_name(bytes, after_first, body.end);
            if second.is_empty() {
                (None, first)
            } else {
                (Some(first), second)
            }
        } else {
            (None, first)
        };

        let after_name = skip_whitespace(text, name_span.end);
        let default = (bytes.get(after_name) == Some(&b'=') && after_name < body.end)
            .then(|| text[after_name + 1..body.end].trim().to_string());

        let (scope, identifier) = split_scope(text, name_span)?;
        let resolved = match (type_span, &default) {
            (Some(type_span), _) => resolve_type(type_span.slice(text), self.ctx.document.uri(), self.locator),
            (None, Some(default)) => self.infer(default),
            (None, None) => DataType::Any.into(),
        };
        Some(self.variable(identifier, scope, resolved).with_initial_value(default))
    }

    fn param_from_attributes(&self, attributes: &Attributes) -> Option<Variable> {
        let name = attributes.get("name")?;
        let (scope, identifier) = split_scope(self.ctx.text(), name.value_span?)?;
        let default = attributes.value("default").map(str::to_string);
        let resolved = match attributes.value("type") {
            Some(type_string) => resolve_type(type_string, self.ctx.document.uri(), self.locator),
            None => match &default {
                Some(default) => self.infer(default),
                None => DataType::Any.into(),
            },
        };
        Some(
            self.variable(identifier, scope, resolved)
                .with_initial_value(default)
                .with_description(attributes.value("hint").map(str::to_string)),
        )
    }

    fn script_assignments(&self, span: Span) -> Vec<Variable> {
        let text = self.ctx.text();
        let Some(haystack) = text.get(span.start..span.end) else {
            return Vec::new();
        };

        SCRIPT_ASSIGNMENT
            .captures_iter(haystack)
            .filter_map(|captures| {
                let name = captures.get(3)?;
                if self.ctx.is_comment(span.start + name.start()) {
                    return None;
                }
                self.assignment_from(&captures, span.start)
            })
            .collect()
    }

    /// Apply an anchored assignment pattern to `span`
    fn assignment(&self, pattern: &Regex, span: Span) -> Option<Variable> {
        let haystack = self.ctx.text().get(span.start..span.end)?;
        let captures = pattern.captures(haystack)?;
        self.assignment_from(&captures, span.start)
    }

    fn assignment_from(&self, captures: &regex::Captures, base: usize) -> Option<Variable> {
        let name = captures.get(3)?;
        let value = captures.get(4).map(|m| m.as_str().trim()).unwrap_or_default();
        let value = value.strip_suffix(';').unwrap_or(value).trim_end();

        let scope = if captures.get(1).is_some() {
            Scope::Local
        } else {
            match captures.get(2) {
                Some(prefix) => Scope::from_prefix(prefix.as_str())?,
                None => Scope::Unknown,
            }
        };

        let mut variable = self
            .variable(
                Span::new(base + name.start(), base + name.end()),
                scope,
                self.infer(value),
            )
            .with_initial_value(Some(value.to_string()));
        if variable.data_type == DataType::Query {
            if let Some(sql) = query_sql(value) {
                variable = variable.into_query(select_column_names(sql));
            }
        }
        Some(variable)
    }

    /// Tags written as function calls inside script
    fn script_tag_calls(&self, span: Span) -> Vec<Variable> {
        let text = self.ctx.text();
        let Some(haystack) = text.get(span.start..span.end) else {
            return Vec::new();
        };

        let mut variables = Vec::new();
        for captures in SCRIPT_TAG_CALL.captures_iter(haystack) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let start = span.start + whole.start();
            if self.ctx.is_comment(start) || output_attributes(name.as_str()).is_none() {
                continue;
            }
            let open = span.start + whole.end() - 1;
            let Some(close) = find_matching_close(text, open, '(', ')') else {
                continue;
            };
            let attributes = parse_attributes(text, Span::new(open + 1, close), None);
            variables.extend(self.output_variables(&name.as_str().to_lowercase(), &attributes, None));
        }
        variables
    }

    fn output_variables(&self, tag_name: &str, attributes: &Attributes, body: Option<Span>) -> Vec<Variable> {
        let Some(outputs) = output_attributes(tag_name) else {
            return Vec::new();
        };
        let text = self.ctx.text();

        outputs
            .iter()
            .filter_map(|output| {
                let attribute = attributes.get(output.attribute)?;
                let (scope, identifier) = split_scope(text, attribute.value_span?)?;
                let resolved = match (tag_name, output.data_type) {
                    ("cfobject", DataType::Component) => {
                        let uri = attributes
                            .value("component")
                            .and_then(|path| self.locator.locate(path, self.ctx.document.uri()));
                        ResolvedType::component(uri)
                    }
                    (_, data_type) => data_type.into(),
                };
                let variable = self.variable(identifier, scope, resolved);
                Some(match (tag_name, output.attribute, body) {
                    ("cfquery", "name", Some(body)) => variable.into_query(select_column_names(body.slice(text))),
                    (_, _, _) if output.data_type == DataType::Query => variable.into_query(Default::default()),
                    _ => variable,
                })
            })
            .collect()
    }

    fn for_in_variables(&self, span: Span) -> Vec<Variable> {
        let text = self.ctx.text();
        let Some(haystack) = text.get(span.start..span.end) else {
            return Vec::new();
        };

        FOR_IN
            .captures_iter(haystack)
            .filter_map(|captures| {
                let name = captures.get(3)?;
                let name = Span::new(span.start + name.start(), span.start + name.end());
                if self.ctx.is_comment(name.start) {
                    return None;
                }
                let scope = if captures.get(1).is_some() {
                    Scope::Local
                } else {
                    match captures.get(2) {
                        Some(prefix) => Scope::from_prefix(prefix.as_str())?,
                        None => Scope::Unknown,
                    }
                };
                Some(self.variable(name, scope, DataType::Any.into()))
            })
            .collect()
    }

    fn infer(&self, value: &str) -> ResolvedType {
        infer_type_from_value(value, self.ctx.document.uri(), self.locator)
    }

    fn variable(&self, identifier: Span, scope: Scope, resolved: ResolvedType) -> Variable {
        Variable::new(
            identifier.slice(self.ctx.text()),
            scope,
            resolved.data_type,
            self.ctx.location(identifier),
        )
        .with_component_uri(resolved.component_uri)
    }
}

/// Analyze a whole document, or `span` of it, in its own dialect
pub fn analyze_variables(ctx: &DocumentContext, span: Option<Span>, locator: &dyn ComponentLocator) -> Vec<Variable> {
    VariableAnalyzer::new(ctx, locator).analyze(span)
}

/// Add `variable` unless an earlier declaration of the same scope and
/// identifier is already present.
///
/// A later-positioned single match is replaced; two or more matches mean
/// the identifier is settled and the newcomer is dropped.
pub fn insert_variable(variables: &mut Vec<Variable>, variable: Variable) {
    let matches: Vec<usize> = variables
        .iter()
        .enumerate()
        .filter(|(_, existing)| existing.matches(variable.scope, &variable.identifier))
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [] => variables.push(variable),
        [index] => {
            let existing = &variables[*index];
            let existing_first = existing.declaration_location.range.start < variable.declaration_location.range.start;
            if !existing_first {
                variables[*index] = variable;
            }
        }
        _ => {}
    }
}

/// Give unscoped assignments the `variables` scope, dropping those that
/// only reassign a local or argument of the same name.
fn resolve_unknown_scopes(variables: Vec<Variable>) -> Vec<Variable> {
    let function_local: Vec<String> = variables
        .iter()
        .filter(|variable| matches!(variable.scope, Scope::Local | Scope::Arguments))
        .map(|variable| variable.identifier.to_lowercase())
        .collect();

    let mut resolved = Vec::with_capacity(variables.len());
    for mut variable in variables {
        if variable.scope == Scope::Unknown {
            if function_local.contains(&variable.identifier.to_lowercase()) {
                continue;
            }
            variable.scope = Scope::Variables;
        }
        insert_variable(&mut resolved, variable);
    }
    resolved
}

/// Find the variable an unscoped reference to `identifier` means, trying
/// scopes in resolution precedence
pub fn resolve_unscoped<'v>(variables: &'v [Variable], identifier: &str) -> Option<&'v Variable> {
    SCOPE_RESOLUTION_PRECEDENCE.iter().find_map(|scope| {
        variables
            .iter()
            .find(|variable| variable.matches(*scope, identifier))
    })
}

/// Split `[scope.]name` written at `span` into its scope and the span of
/// the bare identifier. Dynamic names and struct keys yield `None`.
fn split_scope(text: &str, span: Span) -> Option<(Scope, Span)> {
    let value = span.slice(text);
    let leading = value.len() - value.trim_start().len();
    let value = value.trim();
    if value.is_empty() || value.contains('#') {
        return None;
    }
    let start = span.start + leading;

    let (scope, identifier_start) = match value.split_once('.') {
        Some((prefix, _)) => (Scope::from_prefix(prefix)?, start + prefix.len() + 1),
        None => (Scope::Unknown, start),
    };
    let identifier = Span::new(identifier_start, start + value.len());
    let bytes = identifier.slice(text).as_bytes();
    let valid = bytes
        .first()
        .is_some_and(|first| first.is_ascii_alphabetic() || matches!(first, b'_' | b'$'))
        && bytes.iter().all(|byte| is_identifier_byte(*byte));
    valid.then_some((scope, identifier))
}

/// A possibly scoped identifier starting at `start`
fn read_name(bytes: &[u8], start: usize, end: usize) -> Span {
    let mut idx = start;
    while idx < end && (is_identifier_byte(bytes[idx]) || bytes[idx] == b'.') {
        idx += 1;
    }
    Span::new(start, idx)
}

/// SQL passed as the first string argument of `queryExecute(...)`
fn query_sql(value: &str) -> Option<&str> {
    let open = value.find('(')?;
    let bytes = value.as_bytes();
    let start = skip_whitespace(value, open + 1);
    let quote = *bytes.get(start)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let mut strings = StringState::default();
    let mut idx = start;
    idx += strings.advance(bytes, idx);
    while idx < bytes.len() && strings.in_string() {
        idx += strings.advance(bytes, idx);
    }
    let literal = value.get(start..idx.min(value.len()))?;
    Some(unwrap_literal(literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::interfaces::NoopLocator;
    use crate::types::{Argument, Location, Range, Signature};

    fn analyze(text: &str, is_script: bool) -> Vec<Variable> {
        let document = Document::new("/project/page.cfm", text);
        let ctx = DocumentContext::new(&document, is_script);
        analyze_variables(&ctx, None, &NoopLocator)
    }

    fn summary(variables: &[Variable]) -> Vec<(Scope, &str, DataType)> {
        variables
            .iter()
            .map(|variable| (variable.scope, variable.identifier.as_str(), variable.data_type))
            .collect()
    }

    #[test]
    fn test_script_assignments() {
        let variables = analyze(
            "var count = 0;\nlocal.name = \"x\";\nurl['page'] = 1;\ntotal = count + 1;\nitems = [];\n// hidden = 1;\nif (a == b) {}",
            true,
        );
        assert_eq!(
            summary(&variables),
            vec![
                (Scope::Local, "count", DataType::Numeric),
                (Scope::Local, "name", DataType::String),
                (Scope::Url, "page", DataType::Numeric),
                (Scope::Variables, "total", DataType::Any),
                (Scope::Variables, "items", DataType::Array),
            ]
        );
        assert_eq!(variables[0].initial_value.as_deref(), Some("0"));
    }

    #[test]
    fn test_first_declaration_wins() {
        let variables = analyze("var x = 1;\nvar x = \"two\";", true);
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].data_type, DataType::Numeric);
        assert_eq!(variables[0].declaration_location.range.start.line, 0);
    }

    #[test]
    fn test_unscoped_reassignment_of_local_is_dropped() {
        let variables = analyze("var x = 1;\nx = 2;", true);
        assert_eq!(summary(&variables), vec![(Scope::Local, "x", DataType::Numeric)]);
    }

    #[test]
    fn test_params() {
        let variables = analyze(
            "param name=\"url.id\" type=\"numeric\" default=\"0\";\nparam string title = \"none\";\nparam flag = true;",
            true,
        );
        assert_eq!(
            summary(&variables),
            vec![
                (Scope::Url, "id", DataType::Numeric),
                (Scope::Variables, "title", DataType::String),
                (Scope::Variables, "flag", DataType::Boolean),
            ]
        );
    }

    #[test]
    fn test_for_in_and_query_execute() {
        let variables = analyze(
            "q = queryExecute(\"SELECT id, name AS label FROM users\");\nfor (var row in q) {}",
            true,
        );
        assert_eq!(variables.len(), 2);
        assert!(variables[0].is_query());
        let columns: Vec<_> = variables[0].select_column_names().unwrap().iter().cloned().collect();
        assert_eq!(columns, vec!["id", "label"]);
        assert_eq!(variables[1].scope, Scope::Local);
        assert_eq!(variables[1].identifier, "row");
    }

    #[test]
    fn test_tag_document() {
        let text = r##"<cfparam name="form.email" default="">
<cfset var total = 0>
<cfset session.user = createObject("component", "models.User")>
<cfquery name="people">SELECT id, first_name AS firstName FROM people</cfquery>
<cfloop array="#people#" index="person"></cfloop>
<cfsavecontent variable="html"><p>hi</p></cfsavecontent>
<!--- <cfset ghost = 1> --->
<cfscript>
    scripted = now();
</cfscript>"##;
        let variables = analyze(text, false);
        assert_eq!(
            summary(&variables),
            vec![
                (Scope::Form, "email", DataType::String),
                (Scope::Local, "total", DataType::Numeric),
                (Scope::Session, "user", DataType::Component),
                (Scope::Variables, "people", DataType::Query),
                (Scope::Variables, "person", DataType::Any),
                (Scope::Variables, "html", DataType::String),
                (Scope::Variables, "scripted", DataType::Date),
            ]
        );
        let columns: Vec<_> = variables[3].select_column_names().unwrap().iter().cloned().collect();
        assert_eq!(columns, vec!["firstName", "id"]);
    }

    #[test]
    fn test_embedded_script_wins_only_when_earlier() {
        let text = "<cfscript>x = \"early\";</cfscript>\n<cfset x = 1>\n<cfset y = 1>\n<cfscript>y = \"late\";</cfscript>";
        let variables = analyze(text, false);
        assert_eq!(
            summary(&variables),
            vec![
                (Scope::Variables, "x", DataType::String),
                (Scope::Variables, "y", DataType::Numeric),
            ]
        );
    }

    #[test]
    fn test_script_tag_calls() {
        let variables = analyze("cfhttp(url=\"http://example.com\", result=\"response\");", true);
        assert_eq!(summary(&variables), vec![(Scope::Variables, "response", DataType::Struct)]);
    }

    #[test]
    fn test_arguments_of_enclosing_function() {
        let text = "function f(numeric a) {\n    b = a;\n}";
        let document = Document::new("/project/C.cfc", text);
        let ctx = DocumentContext::new(&document, true);
        let body_start = text.find('{').unwrap();
        let function = UserFunction {
            name: "f".to_string(),
            body_range: Some(document.range(Span::new(body_start, text.len()))),
            signatures: vec![Signature::new(vec![Argument {
                name: "a".to_string(),
                data_type: DataType::Numeric,
                name_range: document.range(Span::new(19, 20)),
                ..Argument::default()
            }])],
            ..UserFunction::default()
        };

        let inner = Span::new(body_start + 1, text.len() - 1);
        let variables = VariableAnalyzer::new(&ctx, &NoopLocator)
            .with_functions([&function])
            .analyze(Some(inner));
        assert_eq!(
            summary(&variables),
            vec![(Scope::Arguments, "a", DataType::Numeric), (Scope::Variables, "b", DataType::Any)]
        );
    }

    fn declared(scope: Scope, identifier: &str, line: u32) -> Variable {
        let range = Range::default();
        let mut location = Location::new("/p/a.cfm", range);
        location.range.start.line = line;
        Variable::new(identifier, scope, DataType::Any, location)
    }

    #[test]
    fn test_resolve_unscoped_precedence() {
        let variables = vec![
            declared(Scope::Variables, "x", 0),
            declared(Scope::Local, "X", 1),
            declared(Scope::Url, "y", 2),
        ];
        assert_eq!(resolve_unscoped(&variables, "x").map(|v| v.scope), Some(Scope::Local));
        assert_eq!(resolve_unscoped(&variables, "y").map(|v| v.scope), Some(Scope::Url));
        assert!(resolve_unscoped(&variables, "z").is_none());
    }

    #[test]
    fn test_insert_variable_rules() {
        let mut variables = Vec::new();
        insert_variable(&mut variables, declared(Scope::Local, "a", 5));
        insert_variable(&mut variables, declared(Scope::Local, "a", 2));
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].declaration_location.range.start.line, 2);

        insert_variable(&mut variables, declared(Scope::Local, "a", 9));
        assert_eq!(variables[0].declaration_location.range.start.line, 2);

        insert_variable(&mut variables, declared(Scope::Variables, "a", 1));
        assert_eq!(variables.len(), 2);
    }

    #[test]
    fn test_output_table_lookup() {
        assert!(output_attributes("CFQUERY").is_some());
        assert!(output_attributes("cfoutput").is_none());
        let loop_outputs = output_attributes("cfloop").unwrap();
        assert_eq!(loop_outputs.iter().map(|o| o.attribute).collect::<Vec<_>>(), vec!["index", "item"]);
    }
}
