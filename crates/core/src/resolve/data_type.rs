//! Semantic type resolution for declared type strings and assigned values.

use crate::interfaces::ComponentLocator;
use crate::resolve::paths::is_dotted_path;
use crate::text::is_string_delimiter;
use crate::types::DataType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// A semantic type, with the component it names when it is one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedType {
    pub data_type: DataType,
    pub component_uri: Option<PathBuf>,
}

impl ResolvedType {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            component_uri: None,
        }
    }

    pub fn component(uri: Option<PathBuf>) -> Self {
        Self {
            data_type: DataType::Component,
            component_uri: uri,
        }
    }
}

impl From<DataType> for ResolvedType {
    fn from(data_type: DataType) -> Self {
        Self::new(data_type)
    }
}

/// Resolve a declared type string.
///
/// Keywords map to their semantic type. Anything else is tried as a dotted
/// component path; when no component is found the type is `any`.
pub fn resolve_type(type_string: &str, base_uri: &Path, locator: &dyn ComponentLocator) -> ResolvedType {
    let type_string = type_string.trim();
    if let Some(data_type) = DataType::from_keyword(type_string) {
        return data_type.into();
    }
    if !is_dotted_path(type_string) {
        return DataType::Any.into();
    }
    match locator.locate(type_string, base_uri) {
        Some(uri) => ResolvedType::component(Some(uri)),
        None => {
            tracing::debug!("Type '{}' did not resolve to a component", type_string);
            DataType::Any.into()
        }
    }
}

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d*)?$").unwrap());
static FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:function\s*\(|\([^)]*\)\s*=>|[$\w]+\s*=>)").unwrap());
static ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:\[|arraynew\s*\(|listtoarray\s*\()").unwrap());
static QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:querynew|queryexecute|queryfilter|querysort|querymap|queryslice)\s*\(").unwrap()
});
static STRUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\{|structnew\s*\(|(?:new\s+)?(?:java:)?java\.util\.hashmap)").unwrap()
});
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:now\s*\(\s*\)|createdate(?:time)?\s*\(|createodbcdate(?:time)?\s*\(|parsedatetime\s*\()")
        .unwrap()
});
static NEW_INSTANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^new\s+(['"]?)([\w$.]+)['"]?\s*\("#).unwrap());
static CREATE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^createobject\s*\(\s*['"]([^'"]+)['"]\s*(?:,\s*['"]([^'"]+)['"])?"#).unwrap());

/// Infer the semantic type of an assigned value from its literal text.
///
/// The checks run in a fixed order; later ones are looser. Object
/// construction (`new a.B()` or `createObject("component", "a.B")`) yields
/// `component`, with its file when the path resolves.
pub fn infer_type_from_value(value: &str, base_uri: &Path, locator: &dyn ComponentLocator) -> ResolvedType {
    let value = value.trim();

    if value.is_empty() {
        return DataType::String.into();
    }
    if is_boolean_literal(value) {
        return DataType::Boolean.into();
    }
    if NUMERIC.is_match(strip_matching_quotes(value).unwrap_or(value)) {
        return DataType::Numeric.into();
    }
    if value.chars().next().is_some_and(is_string_delimiter) && !value[1..].starts_with('#') {
        return DataType::String.into();
    }
    if FUNCTION.is_match(value) {
        return DataType::Function.into();
    }
    if is_ordered_struct_literal(value) {
        return DataType::Struct.into();
    }
    if ARRAY.is_match(value) {
        return DataType::Array.into();
    }
    if QUERY.is_match(value) {
        return DataType::Query.into();
    }
    if STRUCT.is_match(value) {
        return DataType::Struct.into();
    }
    if DATE.is_match(value) {
        return DataType::Date.into();
    }
    if let Some(captures) = NEW_INSTANCE.captures(value) {
        return locate_component(&captures[2], base_uri, locator);
    }
    if let Some(captures) = CREATE_OBJECT.captures(value) {
        let (kind, path) = match captures.get(2) {
            Some(path) => (captures[1].to_string(), path.as_str()),
            None => ("component".to_string(), &captures[1][..]),
        };
        if kind.eq_ignore_ascii_case("component") {
            return locate_component(path, base_uri, locator);
        }
        return DataType::Any.into();
    }

    DataType::Any.into()
}

fn locate_component(dotted_path: &str, base_uri: &Path, locator: &dyn ComponentLocator) -> ResolvedType {
    ResolvedType::component(locator.locate(dotted_path, base_uri))
}

/// `[:]` or `[key: value]`, which would otherwise read as an array
fn is_ordered_struct_literal(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('[') else {
        return false;
    };
    let rest = rest.trim_start();
    rest.starts_with(':')
        || rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .is_some_and(|end| end > 0 && rest[end..].trim_start().starts_with(':'))
}

fn is_boolean_literal(value: &str) -> bool {
    let inner = strip_matching_quotes(value).unwrap_or(value);
    ["true", "false", "yes", "no"]
        .iter()
        .any(|keyword| inner.eq_ignore_ascii_case(keyword))
}

/// `value` without its surrounding quotes, if it is exactly one quoted run
fn strip_matching_quotes(value: &str) -> Option<&str> {
    let first = value.chars().next()?;
    (value.len() >= 2 && is_string_delimiter(first) && value.ends_with(first))
        .then(|| &value[1..value.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::NoopLocator;

    struct FixedLocator;

    impl ComponentLocator for FixedLocator {
        fn locate(&self, dotted_path: &str, _base_uri: &Path) -> Option<PathBuf> {
            dotted_path
                .eq_ignore_ascii_case("foo.Bar")
                .then(|| PathBuf::from("/project/foo/Bar.cfc"))
        }
    }

    fn infer(value: &str) -> DataType {
        infer_type_from_value(value, Path::new("/project/Main.cfc"), &NoopLocator).data_type
    }

    #[test]
    fn test_keywords_any_case() {
        for data_type in DataType::ALL {
            for spelling in [
                data_type.as_str().to_string(),
                data_type.as_str().to_uppercase(),
                data_type.as_str().to_lowercase(),
            ] {
                let resolved = resolve_type(&spelling, Path::new("/p/Main.cfc"), &FixedLocator);
                assert_eq!(resolved.data_type, data_type, "spelling {spelling}");
                assert_eq!(resolved.component_uri, None);
            }
        }
    }

    #[test]
    fn test_resolve_type_component_path() {
        let resolved = resolve_type("foo.Bar", Path::new("/project/Main.cfc"), &FixedLocator);
        assert_eq!(resolved, ResolvedType::component(Some(PathBuf::from("/project/foo/Bar.cfc"))));
    }

    #[test]
    fn test_resolve_type_unknown_path_is_any() {
        let resolved = resolve_type("foo.Missing", Path::new("/project/Main.cfc"), &FixedLocator);
        assert_eq!(resolved, ResolvedType::new(DataType::Any));
    }

    #[test]
    fn test_infer_literals() {
        assert_eq!(infer(""), DataType::String);
        assert_eq!(infer("true"), DataType::Boolean);
        assert_eq!(infer("'No'"), DataType::Boolean);
        assert_eq!(infer("-12.5"), DataType::Numeric);
        assert_eq!(infer("\"42\""), DataType::Numeric);
        assert_eq!(infer("'hello'"), DataType::String);
        assert_eq!(infer("\"#name#\""), DataType::Any);
    }

    #[test]
    fn test_infer_constructors() {
        assert_eq!(infer("function(a) { return a; }"), DataType::Function);
        assert_eq!(infer("(a, b) => a + b"), DataType::Function);
        assert_eq!(infer("[1, 2]"), DataType::Array);
        assert_eq!(infer("arrayNew(1)"), DataType::Array);
        assert_eq!(infer("[:]"), DataType::Struct);
        assert_eq!(infer("queryExecute(sql)"), DataType::Query);
        assert_eq!(infer("{ a: 1 }"), DataType::Struct);
        assert_eq!(infer("structNew()"), DataType::Struct);
        assert_eq!(infer("now()"), DataType::Date);
        assert_eq!(infer("createDateTime(2020, 1, 1)"), DataType::Date);
        assert_eq!(infer("someCall()"), DataType::Any);
    }

    #[test]
    fn test_infer_object_construction() {
        let base = Path::new("/project/Main.cfc");

        let resolved = infer_type_from_value("new foo.Bar(1)", base, &FixedLocator);
        assert_eq!(resolved.component_uri, Some(PathBuf::from("/project/foo/Bar.cfc")));

        let resolved = infer_type_from_value("createObject('component', 'foo.Bar')", base, &FixedLocator);
        assert_eq!(resolved.component_uri, Some(PathBuf::from("/project/foo/Bar.cfc")));

        let resolved = infer_type_from_value("createObject(\"foo.Bar\")", base, &FixedLocator);
        assert_eq!(resolved.data_type, DataType::Component);

        let resolved = infer_type_from_value("new foo.Missing()", base, &FixedLocator);
        assert_eq!(resolved, ResolvedType::component(None));

        let resolved = infer_type_from_value("createObject('java', 'java.lang.String')", base, &FixedLocator);
        assert_eq!(resolved.data_type, DataType::Any);
    }
}
