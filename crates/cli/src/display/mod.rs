pub mod formatter;

pub use formatter::{
    print_component, print_definition, print_descriptor, print_json, print_symbol_tree, print_variables,
};
