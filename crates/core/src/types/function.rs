use super::{DataType, Location, Range};
use crate::impl_case_insensitive_deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Visibility of a user-defined function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Private,
    Package,
    Remote,
}

impl_case_insensitive_deserialize!(
    Access,
    Public => "public",
    Private => "private",
    Package => "package",
    Remote => "remote"
);

impl Access {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Access::Public),
            "private" => Some(Access::Private),
            "package" => Some(Access::Package),
            "remote" => Some(Access::Remote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
            Access::Package => "package",
            Access::Remote => "remote",
        }
    }
}

/// A declared function argument
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub data_type: DataType,
    /// Set when `data_type` is [`DataType::Component`] and the path resolved
    pub data_type_component_uri: Option<PathBuf>,
    pub required: bool,
    pub default: Option<String>,
    pub description: Option<String>,
    pub name_range: Range,
    pub data_type_range: Option<Range>,
}

/// One callable shape of a function; parameter order is declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signature {
    pub parameters: Vec<Argument>,
}

impl Signature {
    pub fn new(parameters: Vec<Argument>) -> Self {
        Self { parameters }
    }

    /// Render as `name(type arg, [type arg])`
    pub fn label(&self, name: &str) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|arg| {
                let text = format!("{} {}", arg.data_type, arg.name);
                if arg.required { text } else { format!("[{text}]") }
            })
            .collect();
        format!("{}({})", name, params.join(", "))
    }
}

/// A function declared in (or synthesised for) a component
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserFunction {
    pub name: String,
    pub description: Option<String>,
    pub access: Access,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub return_type: DataType,
    pub return_type_component_uri: Option<PathBuf>,
    pub return_type_range: Option<Range>,
    pub name_range: Range,
    pub body_range: Option<Range>,
    /// Always holds at least one signature
    pub signatures: Vec<Signature>,
    pub location: Location,
    /// True for getters and setters derived from properties
    pub is_implicit: bool,
}

impl UserFunction {
    /// The signature used for display and parameter hints
    pub fn active_signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argument(name: &str, data_type: DataType, required: bool) -> Argument {
        Argument {
            name: name.to_string(),
            data_type,
            data_type_component_uri: None,
            required,
            default: None,
            description: None,
            name_range: Range::default(),
            data_type_range: None,
        }
    }

    #[test]
    fn test_access_keywords() {
        assert_eq!(Access::from_keyword("PRIVATE"), Some(Access::Private));
        assert_eq!(Access::from_keyword("static"), None);
    }

    #[test]
    fn test_signature_label_brackets_optional_arguments() {
        let signature = Signature::new(vec![
            argument("name", DataType::String, true),
            argument("age", DataType::Numeric, false),
        ]);
        assert_eq!(signature.label("greet"), "greet(string name, [numeric age])");
    }
}
