use crate::impl_case_insensitive_deserialize;
use serde::Serialize;
use std::fmt;

/// The closed set of semantic types used in place of free-form type strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Any,
    Array,
    Binary,
    Boolean,
    Component,
    Date,
    Function,
    Guid,
    Numeric,
    Query,
    String,
    Struct,
    Uuid,
    VariableName,
    Void,
    Xml,
}

impl_case_insensitive_deserialize!(
    DataType,
    Any => "any",
    Array => "array",
    Binary => "binary",
    Boolean => "boolean",
    Component => "component",
    Date => "date",
    Function => "function",
    Guid => "guid",
    Numeric => "numeric",
    Query => "query",
    String => "string",
    Struct => "struct",
    Uuid => "uuid",
    VariableName => "variablename",
    Void => "void",
    Xml => "xml"
);

impl DataType {
    pub const ALL: [DataType; 16] = [
        DataType::Any,
        DataType::Array,
        DataType::Binary,
        DataType::Boolean,
        DataType::Component,
        DataType::Date,
        DataType::Function,
        DataType::Guid,
        DataType::Numeric,
        DataType::Query,
        DataType::String,
        DataType::Struct,
        DataType::Uuid,
        DataType::VariableName,
        DataType::Void,
        DataType::Xml,
    ];

    /// Look up a type keyword case-insensitively.
    ///
    /// Returns `None` for anything outside the vocabulary, which callers may
    /// then try as a dotted component path.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        Self::ALL
            .into_iter()
            .find(|data_type| data_type.as_str().eq_ignore_ascii_case(keyword))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Any => "any",
            DataType::Array => "array",
            DataType::Binary => "binary",
            DataType::Boolean => "boolean",
            DataType::Component => "component",
            DataType::Date => "date",
            DataType::Function => "function",
            DataType::Guid => "guid",
            DataType::Numeric => "numeric",
            DataType::Query => "query",
            DataType::String => "string",
            DataType::Struct => "struct",
            DataType::Uuid => "uuid",
            DataType::VariableName => "variableName",
            DataType::Void => "void",
            DataType::Xml => "xml",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword_ignores_case() {
        for data_type in DataType::ALL {
            let keyword = data_type.as_str();
            assert_eq!(DataType::from_keyword(keyword), Some(data_type));
            assert_eq!(DataType::from_keyword(&keyword.to_uppercase()), Some(data_type));
            assert_eq!(DataType::from_keyword(&keyword.to_lowercase()), Some(data_type));
        }
    }

    #[test]
    fn test_from_keyword_rejects_paths() {
        assert_eq!(DataType::from_keyword("models.User"), None);
        assert_eq!(DataType::from_keyword(""), None);
    }

    #[test]
    fn test_deserialize_case_insensitive() {
        let data_type: DataType = serde_json::from_str(r#""VariableName""#).unwrap();
        assert_eq!(data_type, DataType::VariableName);
        let data_type: DataType = serde_json::from_str(r#""STRUCT""#).unwrap();
        assert_eq!(data_type, DataType::Struct);
    }
}
