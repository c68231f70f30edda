//! Indexing a project on disk, including config discovery

use cfml_lens_core::services::StdFileSystem;
use cfml_lens_core::symbols::definition_at;
use cfml_lens_core::{ConfigLoader, Document, FileUpdate, Indexer, Scope};
use std::fs;
use tempfile::TempDir;

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("models")).unwrap();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::create_dir_all(root.join("shared/lib")).unwrap();

    let config = serde_json::json!({
        "mappings": [{ "prefix": "lib", "directory": "shared/lib" }]
    });
    fs::write(
        root.join(".cfml-lens.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    fs::write(
        root.join("Application.cfc"),
        "component {\n    function onApplicationStart() {\n        application.settings = {};\n        variables.ignored = 1;\n    }\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("models/User.cfc"),
        "component extends=\"lib.Entity\" {\n    function save() {\n        var helper = new lib.Entity();\n        return validate();\n    }\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("shared/lib/Entity.cfc"),
        "component {\n    function validate() {\n        return true;\n    }\n}\n",
    )
    .unwrap();
    fs::write(root.join("node_modules/pkg/Skipped.cfc"), "component {}").unwrap();
    temp_dir
}

#[test]
fn test_reindex_with_mappings_and_excludes() {
    let temp_dir = project();
    let root = temp_dir.path();

    let config = ConfigLoader::load_with_boundary(root, Some(root)).unwrap();
    let mut indexer = Indexer::new(StdFileSystem::new(), root, config);
    let mut cache = indexer.new_cache();

    let stats = indexer.reindex(&mut cache).unwrap();
    assert_eq!(stats.files, 3);
    assert_eq!(stats.components, 3);
    assert_eq!(stats.failed, 0);

    let user = cache.get_component(&root.join("models/User.cfc")).unwrap();
    assert_eq!(user.extends_uri(), Some(&root.join("shared/lib/Entity.cfc")));

    let application: Vec<_> = cache
        .all_application_variables()
        .flat_map(|(_, variables)| variables)
        .collect();
    assert_eq!(application.len(), 1);
    assert_eq!(application[0].scope, Scope::Application);
    assert_eq!(application[0].identifier, "settings");

    // a second pass finds every file unchanged and keeps the same entries
    let again = indexer.reindex(&mut cache).unwrap();
    assert_eq!(again.unchanged, 3);
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_incremental_update_and_removal() {
    let temp_dir = project();
    let root = temp_dir.path();

    let config = ConfigLoader::load_with_boundary(root, Some(root)).unwrap();
    let mut indexer = Indexer::new(StdFileSystem::new(), root, config);
    let mut cache = indexer.new_cache();
    indexer.reindex(&mut cache).unwrap();

    let user = root.join("models/User.cfc");
    fs::write(&user, "component {\n    function load() {}\n}\n").unwrap();
    assert_eq!(indexer.update_file(&mut cache, &user).unwrap(), FileUpdate::Updated);
    assert!(cache.search_functions_by_prefix("sa").is_empty());
    assert_eq!(cache.search_functions_by_prefix("lo").len(), 1);

    fs::remove_file(&user).unwrap();
    let stats = indexer.reindex(&mut cache).unwrap();
    assert_eq!(stats.removed, 1);
    assert!(cache.get_component(&user).is_none());
    assert!(cache.search_functions_by_prefix("lo").is_empty());

    let readme = root.join("README.md");
    fs::write(&readme, "# notes").unwrap();
    assert_eq!(indexer.update_file(&mut cache, &readme).unwrap(), FileUpdate::Ignored);
}

#[test]
fn test_definitions_across_indexed_files() {
    let temp_dir = project();
    let root = temp_dir.path();

    let config = ConfigLoader::load_with_boundary(root, Some(root)).unwrap();
    let mut indexer = Indexer::new(StdFileSystem::new(), root, config);
    let mut cache = indexer.new_cache();
    indexer.reindex(&mut cache).unwrap();

    let path = root.join("models/User.cfc");
    let document = Document::new(&path, fs::read_to_string(&path).unwrap());
    let user = cache.get_component(&path).cloned().unwrap();
    let text = document.text();

    let call = text.find("validate").unwrap();
    let definition = definition_at(&cache, &document, Some(&user), call + 2).unwrap();
    assert_eq!(definition.name, "validate");
    assert_eq!(definition.location.uri, root.join("shared/lib/Entity.cfc"));
    assert_eq!(definition.location.range.start.line, 1);

    let constructed = text.find("Entity()").unwrap();
    let definition = definition_at(&cache, &document, Some(&user), constructed + 1).unwrap();
    assert_eq!(definition.name, "Entity");

    let helper = text.find("helper").unwrap();
    let definition = definition_at(&cache, &document, Some(&user), helper).unwrap();
    assert_eq!(definition.location.range.start.line, 2);
}
