//! Documentation read from a local data directory
//!
//! Each entity is one JSON file named after its lowercased name, for
//! example `<docs_dir>/arrayappend.json` or `<docs_dir>/cfquery.json`.

use crate::error::{Error, Result};
use crate::interfaces::{DocumentationLookup, EntityDescriptor};
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LocalDocumentation {
    directory: PathBuf,
}

impl LocalDocumentation {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn descriptor_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.json", name.to_lowercase()))
    }
}

impl DocumentationLookup for LocalDocumentation {
    async fn lookup(&self, name: &str) -> Result<Option<EntityDescriptor>> {
        let path = self.descriptor_path(name);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::DocumentationError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let descriptor: EntityDescriptor = serde_json::from_str(&contents)?;
        Ok(Some(descriptor))
    }

    async fn all_names(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await.map_err(|e| {
            Error::DocumentationError(format!("Failed to list {}: {}", self.directory.display(), e))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_lowercase());
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::EntityKind;
    use crate::types::DataType;
    use tempfile::TempDir;

    fn write_docs(dir: &std::path::Path) {
        std::fs::write(
            dir.join("arrayappend.json"),
            r#"{
                "name": "arrayAppend",
                "type": "Function",
                "syntax": "arrayAppend(array, value)",
                "returns": "boolean",
                "params": [
                    {"name": "array", "type": "array", "required": true},
                    {"name": "value", "type": "any", "required": true}
                ]
            }"#,
        )
        .unwrap();
        std::fs::write(dir.join("cfquery.json"), r#"{"name": "cfquery", "type": "tag", "has_body": true}"#).unwrap();
        std::fs::write(dir.join("broken.json"), "{").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let temp = TempDir::new().unwrap();
        write_docs(temp.path());
        let docs = LocalDocumentation::new(temp.path());

        let descriptor = docs.lookup("ArrayAppend").await.unwrap().unwrap();
        assert_eq!(descriptor.kind, EntityKind::Function);
        assert_eq!(descriptor.returns, Some(DataType::Boolean));
        assert_eq!(descriptor.params.len(), 2);
        assert!(descriptor.params[0].required);

        let tag = docs.lookup("cfquery").await.unwrap().unwrap();
        assert_eq!(tag.kind, EntityKind::Tag);
        assert_eq!(tag.has_body, Some(true));
    }

    #[tokio::test]
    async fn test_lookup_not_found_and_error_are_distinct() {
        let temp = TempDir::new().unwrap();
        write_docs(temp.path());
        let docs = LocalDocumentation::new(temp.path());

        assert!(docs.lookup("nosuchfunction").await.unwrap().is_none());
        assert!(matches!(
            docs.lookup("broken").await,
            Err(Error::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_all_names() {
        let temp = TempDir::new().unwrap();
        write_docs(temp.path());
        let docs = LocalDocumentation::new(temp.path());

        assert_eq!(docs.all_names().await.unwrap(), vec!["arrayappend", "broken", "cfquery"]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_error() {
        let temp = TempDir::new().unwrap();
        let docs = LocalDocumentation::new(temp.path().join("missing"));
        assert!(docs.all_names().await.is_err());
    }
}
