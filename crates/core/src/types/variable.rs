use super::{DataType, Location, Scope};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What kind of value a variable holds, decided when it is declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Plain,
    Query {
        /// Column names from the `SELECT` clause, aliases preferred
        select_column_names: BTreeSet<String>,
    },
}

/// A declared variable with its inferred scope and type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub identifier: String,
    pub data_type: DataType,
    pub data_type_component_uri: Option<PathBuf>,
    pub scope: Scope,
    pub declaration_location: Location,
    pub description: Option<String>,
    pub initial_value: Option<String>,
    #[serde(flatten)]
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(
        identifier: impl Into<String>,
        scope: Scope,
        data_type: DataType,
        declaration_location: Location,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            data_type,
            data_type_component_uri: None,
            scope,
            declaration_location,
            description: None,
            initial_value: None,
            kind: VariableKind::Plain,
        }
    }

    pub fn with_component_uri(mut self, uri: Option<PathBuf>) -> Self {
        self.data_type_component_uri = uri;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_initial_value(mut self, value: Option<String>) -> Self {
        self.initial_value = value;
        self
    }

    /// Turn this into a query result variable
    pub fn into_query(mut self, select_column_names: BTreeSet<String>) -> Self {
        self.data_type = DataType::Query;
        self.kind = VariableKind::Query {
            select_column_names,
        };
        self
    }

    pub fn is_query(&self) -> bool {
        matches!(self.kind, VariableKind::Query { .. })
    }

    pub fn select_column_names(&self) -> Option<&BTreeSet<String>> {
        match &self.kind {
            VariableKind::Query {
                select_column_names,
            } => Some(select_column_names),
            VariableKind::Plain => None,
        }
    }

    /// Same scope and case-insensitively equal identifier
    pub fn matches(&self, scope: Scope, identifier: &str) -> bool {
        self.scope == scope && self.identifier.eq_ignore_ascii_case(identifier)
    }
}
