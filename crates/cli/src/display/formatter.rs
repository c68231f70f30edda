use anyhow::{Context, Result};
use cfml_lens_core::interfaces::{EntityDescriptor, EntityKind};
use cfml_lens_core::symbols::{Definition, DocumentSymbol, SymbolKind};
use cfml_lens_core::{Component, Range, Variable};
use serde::Serialize;
use std::path::Path;

/// Print any result as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// 1-based `line:column` for display
fn format_range(range: &Range) -> String {
    format!("{}:{}", range.start.line + 1, range.start.character + 1)
}

fn symbol_icon(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Component => "🧩",
        SymbolKind::Interface => "🔌",
        SymbolKind::Property => "🏷️ ",
        SymbolKind::Function => "🔧",
        SymbolKind::Variable => "📦",
    }
}

pub fn print_component(component: &Component) {
    let kind = if component.is_interface { "Interface" } else { "Component" };
    let dialect = if component.is_script { "script" } else { "tag" };
    println!("🧩 {} '{}' ({} syntax)", kind, component.name, dialect);
    println!("   📁 {}", component.uri.display());

    if let Some(displayname) = &component.displayname {
        println!("   🏷️  Display name: {displayname}");
    }
    if let Some(hint) = &component.hint {
        println!("   💬 {hint}");
    }
    if let Some(extends) = &component.extends {
        println!("   ⬆️  Extends: {}", extends.uri.display());
    }
    if let Some(implements) = &component.implements {
        for interface in implements {
            println!("   🔌 Implements: {}", interface.uri.display());
        }
    }
    if component.accessors {
        println!("   🔑 Accessors enabled");
    }
    if let Some(initmethod) = &component.initmethod {
        println!("   🚀 Init method: {initmethod}");
    }

    if !component.properties.is_empty() {
        println!("\n🏷️  Properties ({}):", component.properties.len());
        let mut properties: Vec<_> = component.properties.values().collect();
        properties.sort_by_key(|property| property.location.range.start);
        for property in properties {
            println!(
                "   {} {} [{}]",
                property.data_type,
                property.name,
                format_range(&property.name_range)
            );
        }
    }

    if !component.functions.is_empty() {
        println!("\n🔧 Functions ({}):", component.functions.len());
        let mut functions: Vec<_> = component.functions.values().collect();
        functions.sort_by_key(|function| function.location.range.start);
        for function in functions {
            let label = function
                .active_signature()
                .map(|signature| signature.label(&function.name))
                .unwrap_or_else(|| format!("{}()", function.name));
            println!(
                "   {} {} {} [{}]",
                function.access.as_str(),
                function.return_type,
                label,
                format_range(&function.name_range)
            );
        }
    }

    if !component.variables.is_empty() {
        println!("\n📦 Variables ({}):", component.variables.len());
        print_variable_lines(&component.variables);
    }
}

fn print_variable_lines(variables: &[Variable]) {
    for variable in variables {
        print!(
            "   {}.{}: {} [{}]",
            variable.scope,
            variable.identifier,
            variable.data_type,
            format_range(&variable.declaration_location.range)
        );
        if let Some(uri) = &variable.data_type_component_uri {
            print!(" -> {}", uri.display());
        }
        println!();
    }
}

pub fn print_variables(path: &Path, line: Option<usize>, variables: &[Variable]) {
    println!(
        "📦 Variables in {}{}",
        path.display(),
        if let Some(l) = line {
            format!(" visible at line {}", l + 1)
        } else {
            String::new()
        }
    );
    println!("{}", "=".repeat(80));
    if variables.is_empty() {
        println!("   (none)");
    } else {
        print_variable_lines(variables);
    }
}

fn print_symbol(symbol: &DocumentSymbol, depth: usize) {
    let indent = "   ".repeat(depth);
    print!("{}{} {}", indent, symbol_icon(symbol.kind), symbol.name);
    if let Some(detail) = &symbol.detail {
        print!(" - {detail}");
    }
    println!(" [{}]", format_range(&symbol.selection_range));
    for child in &symbol.children {
        print_symbol(child, depth + 1);
    }
}

pub fn print_symbol_tree(path: &Path, symbols: &[DocumentSymbol]) {
    println!("🔍 Symbols: {}", path.display());
    println!("{}", "=".repeat(80));
    for symbol in symbols {
        print_symbol(symbol, 0);
    }
}

pub fn print_definition(definition: &Definition) {
    println!(
        "{} {} -> {}:{}",
        symbol_icon(definition.kind),
        definition.name,
        definition.location.uri.display(),
        format_range(&definition.location.range)
    );
}

pub fn print_descriptor(descriptor: &EntityDescriptor) {
    let kind = match descriptor.kind {
        EntityKind::Function => "Function",
        EntityKind::Tag => "Tag",
    };
    println!("📚 {} '{}'", kind, descriptor.name);
    if !descriptor.syntax.is_empty() {
        println!("   {}", descriptor.syntax);
    }
    if let Some(returns) = descriptor.returns {
        println!("   ↩️  Returns: {returns}");
    }
    if let Some(description) = &descriptor.description {
        println!("\n{description}");
    }
    if !descriptor.params.is_empty() {
        println!("\n⚙️  Parameters:");
        for param in &descriptor.params {
            print!(
                "   {} {}{}",
                param.data_type,
                param.name,
                if param.required { " (required)" } else { "" }
            );
            if let Some(default) = &param.default {
                print!(" = {default}");
            }
            println!();
            if let Some(description) = &param.description {
                println!("      {description}");
            }
            if !param.values.is_empty() {
                println!("      one of: {}", param.values.join(", "));
            }
        }
    }
}
