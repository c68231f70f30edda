use super::{DataType, Location, Range};
use serde::Serialize;
use std::path::PathBuf;

/// A component property; re-derived on every parse of its owner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub data_type: DataType,
    pub data_type_component_uri: Option<PathBuf>,
    pub description: Option<String>,
    pub default: Option<String>,
    /// `None` inherits the default of `true`
    pub getter: Option<bool>,
    /// `None` inherits the default of `true`
    pub setter: Option<bool>,
    pub name_range: Range,
    pub data_type_range: Option<Range>,
    pub location: Location,
}

impl Property {
    pub fn has_getter(&self) -> bool {
        self.getter.unwrap_or(true)
    }

    pub fn has_setter(&self) -> bool {
        self.setter.unwrap_or(true)
    }
}
