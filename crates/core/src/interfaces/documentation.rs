//! Documentation lookup interface
//!
//! Built-in tag and function documentation lives outside the engine. Hosts
//! provide it through [`DocumentationLookup`], keyed by lowercased name.

use crate::error::Result;
use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// Whether a descriptor documents a tag or a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Function,
    Tag,
}

crate::impl_case_insensitive_deserialize!(
    EntityKind,
    Function => "function",
    Tag => "tag"
);

/// One documented parameter or tag attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub required: bool,
    pub description: Option<String>,
    pub default: Option<String>,
    /// Accepted values for enumerated parameters
    pub values: Vec<String>,
}

/// Documentation for one built-in tag or function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EntityDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub syntax: String,
    pub description: Option<String>,
    pub params: Vec<ParameterDescriptor>,
    /// Return type of functions
    pub returns: Option<DataType>,
    /// Whether a tag takes a body
    pub has_body: Option<bool>,
}

/// Asynchronous source of built-in documentation.
///
/// `Ok(None)` means the name is unknown; `Err` means the source itself
/// failed. Callers treat the two differently.
#[allow(async_fn_in_trait)]
pub trait DocumentationLookup {
    async fn lookup(&self, name: &str) -> Result<Option<EntityDescriptor>>;

    /// Every name this source can describe, lowercased and sorted
    async fn all_names(&self) -> Result<Vec<String>>;
}
