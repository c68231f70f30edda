//! End-to-end parsing and caching scenarios over real files

use cfml_lens_core::cache::{all_functions, find_function, implicit_functions};
use cfml_lens_core::services::{FileSystemLocator, StdFileSystem};
use cfml_lens_core::{Access, DataType, Document, EntityCache, ProjectLayout, parse_component};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, text: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

fn parse_file(root: &Path, path: &Path) -> cfml_lens_core::Component {
    let text = fs::read_to_string(path).unwrap();
    let locator = FileSystemLocator::new(StdFileSystem::new(), ProjectLayout::new(root));
    parse_component(&Document::new(path, text), &locator).unwrap()
}

#[test]
fn test_doc_comment_extends_on_tag_component() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let bar = write(root, "foo/Bar.cfc", "component {}");
    let text = "/** @extends foo.Bar */\n<cfcomponent>\n  <cffunction name=\"run\"></cffunction>\n</cfcomponent>\n";
    let child = write(root, "app/Child.cfc", text);

    let component = parse_file(root, &child);
    assert!(!component.is_script);

    let extends = component.extends.expect("extends should resolve");
    assert_eq!(extends.uri, bar);

    // only the last segment of the dotted path
    let bar_column = text.find("Bar").unwrap() as u32;
    assert_eq!(extends.range.start.line, 0);
    assert_eq!(extends.range.start.character, bar_column);
    assert_eq!(extends.range.end.character, bar_column + 3);
}

#[test]
fn test_script_function_signature() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let path = write(
        root,
        "Greeter.cfc",
        "component {\n    public string function greet(required string name=\"x\") {\n        return \"Hello \" & name;\n    }\n}\n",
    );

    let component = parse_file(root, &path);
    assert_eq!(component.functions.len(), 1);

    let greet = component.function("greet").unwrap();
    assert_eq!(greet.name, "greet");
    assert_eq!(greet.access, Access::Public);
    assert_eq!(greet.return_type, DataType::String);
    assert_eq!(greet.signatures.len(), 1);

    let arguments = &greet.signatures[0].parameters;
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].name, "name");
    assert_eq!(arguments[0].data_type, DataType::String);
    assert!(arguments[0].required);
    assert_eq!(arguments[0].default.as_deref(), Some("x"));
}

#[test]
fn test_implicit_accessors_are_derived_not_declared() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let path = write(root, "Person.cfc", "component accessors=\"true\" {\n    property name=\"name\";\n}\n");

    let component = parse_file(root, &path);
    assert!(component.functions.is_empty());

    let mut cache = EntityCache::new(ProjectLayout::new(root));
    cache.cache_component(component.clone());

    let implicit = implicit_functions(&cache, &component, false);
    let names: Vec<&str> = implicit.values().map(|function| function.name.as_str()).collect();
    assert_eq!(names, vec!["getName", "setName"]);

    assert!(!all_functions(&cache, &component, false).contains_key("getname"));
    assert!(all_functions(&cache, &component, true).contains_key("getname"));
    assert!(find_function(&cache, &component, "SETNAME").is_some());
}

#[test]
fn test_function_search_follows_cache_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let path = write(root, "A.cfc", "component {\n    function init() {\n        return this;\n    }\n}\n");

    let mut cache = EntityCache::new(ProjectLayout::new(root));
    cache.cache_component(parse_file(root, &path));

    let found: Vec<&str> = cache
        .search_functions_by_prefix("in")
        .into_iter()
        .map(|function| function.name.as_str())
        .collect();
    assert_eq!(found, vec!["init"]);

    assert!(cache.clear_component(&path).is_some());
    assert!(cache.search_functions_by_prefix("in").is_empty());
    assert!(cache.is_empty());
}
