//! Walking `extends` chains through the cache.

use super::entity_cache::EntityCache;
use crate::parser::implicit_accessors;
use crate::types::{Component, UserFunction};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Cached ancestors of `component`, nearest first.
///
/// The walk stops at the first unresolved or uncached parent, and at a
/// parent already visited.
pub fn ancestors<'a>(cache: &'a EntityCache, component: &Component) -> Vec<&'a Component> {
    let mut visited: HashSet<PathBuf> = HashSet::from([component.uri.clone()]);
    let mut chain = Vec::new();
    let mut next = component.extends_uri().cloned();

    while let Some(uri) = next {
        let Some(parent) = cache.get_component(&uri) else {
            break;
        };
        if !visited.insert(parent.uri.clone()) {
            tracing::warn!("Inheritance cycle through {}", parent.uri.display());
            break;
        }
        chain.push(parent);
        next = parent.extends_uri().cloned();
    }

    chain
}

/// `component` followed by its ancestors
pub fn inheritance_chain<'a>(cache: &'a EntityCache, component: &'a Component) -> Vec<&'a Component> {
    let mut chain = vec![component];
    chain.extend(ancestors(cache, component));
    chain
}

/// Functions `component` inherits without redeclaring, keyed by lowercased
/// name. The nearest ancestor declaring a name wins.
pub fn inherited_functions(cache: &EntityCache, component: &Component) -> BTreeMap<String, UserFunction> {
    let mut inherited = BTreeMap::new();
    for ancestor in ancestors(cache, component) {
        for (key, function) in &ancestor.functions {
            if !component.functions.contains_key(key) {
                inherited.entry(key.clone()).or_insert_with(|| function.clone());
            }
        }
    }
    inherited
}

/// Implicit getters and setters of `component`, optionally including those
/// contributed by its ancestors
pub fn implicit_functions(
    cache: &EntityCache,
    component: &Component,
    include_inherited: bool,
) -> BTreeMap<String, UserFunction> {
    if include_inherited {
        implicit_accessors(&inheritance_chain(cache, component))
    } else {
        implicit_accessors(&[component])
    }
}

/// Every function callable on `component`: declared, inherited and, when
/// asked for, implicit accessors. At each level of the chain, declared
/// functions come before synthesized ones and nearer levels win.
pub fn all_functions(
    cache: &EntityCache,
    component: &Component,
    include_implicit: bool,
) -> BTreeMap<String, UserFunction> {
    let chain = inheritance_chain(cache, component);
    let mut functions = BTreeMap::new();

    for level in 0..chain.len() {
        for (key, function) in &chain[level].functions {
            functions.entry(key.clone()).or_insert_with(|| function.clone());
        }
        if include_implicit {
            for (key, function) in implicit_accessors(&chain[..=level]) {
                functions.entry(key).or_insert(function);
            }
        }
    }

    functions
}

/// Look up one callable function by name, case-insensitively
pub fn find_function(cache: &EntityCache, component: &Component, name: &str) -> Option<UserFunction> {
    let key = name.to_lowercase();
    if let Some(function) = component.functions.get(&key) {
        return Some(function.clone());
    }
    all_functions(cache, component, true).remove(&key)
}
