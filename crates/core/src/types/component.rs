use super::{Property, Range, UserFunction, Variable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A resolved reference to another component file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReference {
    pub uri: PathBuf,
    /// Covers only the final segment of the dotted path
    pub range: Range,
}

/// Functions keyed by lowercased name
pub type ComponentFunctions = BTreeMap<String, UserFunction>;

/// Properties keyed by lowercased name
pub type ComponentProperties = BTreeMap<String, Property>;

/// One parsed `.cfc` source unit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Component {
    pub uri: PathBuf,
    pub name: String,
    pub is_script: bool,
    pub is_interface: bool,
    pub declaration_range: Range,
    pub displayname: Option<String>,
    pub hint: Option<String>,
    pub accessors: bool,
    pub initmethod: Option<String>,
    pub extends: Option<ComponentReference>,
    pub implements: Option<Vec<ComponentReference>>,
    pub functions: ComponentFunctions,
    pub properties: ComponentProperties,
    pub variables: Vec<Variable>,
}

impl Component {
    /// Look up a declared function case-insensitively
    pub fn function(&self, name: &str) -> Option<&UserFunction> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(&name.to_lowercase())
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    pub fn extends_uri(&self) -> Option<&PathBuf> {
        self.extends.as_ref().map(|reference| &reference.uri)
    }
}
