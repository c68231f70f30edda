use super::prefix_index::PrefixIndex;
use crate::interfaces::ComponentLocator;
use crate::resolve::ProjectLayout;
use crate::types::{Component, UserFunction, Variable};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// In-memory index of every parsed component of a project.
///
/// Components are keyed by file identity and grouped by lowercased name;
/// component and function names are additionally kept in prefix indexes
/// for completion-style search. Nothing here touches the disk; callers
/// feed it parsed components.
///
/// The cache has no internal locking. Share it behind a single writer
/// (e.g. `Arc<RwLock<EntityCache>>`) when mutating from several tasks.
#[derive(Debug, Default)]
pub struct EntityCache {
    layout: ProjectLayout,
    components: BTreeMap<PathBuf, Component>,
    /// Lowercased path → identity, for case-insensitive file systems
    identities: HashMap<String, PathBuf>,
    component_names: HashMap<String, BTreeSet<PathBuf>>,
    component_prefixes: PrefixIndex,
    /// Lowercased function name → identities of the owning components
    function_owners: HashMap<String, BTreeSet<PathBuf>>,
    function_prefixes: PrefixIndex,
    application_variables: BTreeMap<PathBuf, Vec<Variable>>,
    server_variables: BTreeMap<PathBuf, Vec<Variable>>,
}

fn identity_key(uri: &Path) -> String {
    uri.to_string_lossy().to_lowercase()
}

impl EntityCache {
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: ProjectLayout) {
        self.layout = layout;
    }

    /// Insert or replace a component and register its name.
    ///
    /// Functions are not indexed; use [`EntityCache::cache_component`] for that.
    /// Functions of a replaced component that the new one no longer declares
    /// are dropped from the function index.
    pub fn set_component(&mut self, component: Component) {
        let uri = component.uri.clone();
        let name = component.name.to_lowercase();

        if let Some(previous) = self.components.get(&uri) {
            let previous_name = previous.name.to_lowercase();
            let dropped: Vec<String> = previous
                .functions
                .keys()
                .filter(|key| !component.functions.contains_key(*key))
                .cloned()
                .collect();
            if previous_name != name {
                self.remove_from_name_group(&previous_name, &uri);
            }
            for key in dropped {
                self.unregister_function(&key, &uri);
            }
        }

        self.identities.insert(identity_key(&uri), uri.clone());
        self.component_names.entry(name.clone()).or_default().insert(uri.clone());
        self.component_prefixes.insert(&name);
        self.components.insert(uri, component);
    }

    pub fn get_component(&self, uri: &Path) -> Option<&Component> {
        self.components.get(uri).or_else(|| {
            let identity = self.identities.get(&identity_key(uri))?;
            self.components.get(identity)
        })
    }

    pub fn contains(&self, uri: &Path) -> bool {
        self.get_component(uri).is_some()
    }

    /// Remove a component, its name and every function it owned from the
    /// indexes. Removing an unknown identity is a no-op.
    pub fn clear_component(&mut self, uri: &Path) -> Option<Component> {
        let identity = if self.components.contains_key(uri) {
            uri.to_path_buf()
        } else {
            self.identities.get(&identity_key(uri))?.clone()
        };
        let component = self.components.remove(&identity)?;
        self.identities.remove(&identity_key(&identity));
        self.remove_from_name_group(&component.name.to_lowercase(), &identity);

        for key in component.functions.keys() {
            self.unregister_function(key, &identity);
        }

        tracing::debug!("Cleared component {}", identity.display());
        Some(component)
    }

    /// [`EntityCache::set_component`] plus registration of every declared
    /// function in the function index
    pub fn cache_component(&mut self, component: Component) {
        if self.components.contains_key(&component.uri) {
            self.clear_component(&component.uri.clone());
        }

        let uri = component.uri.clone();
        for key in component.functions.keys() {
            self.function_owners.entry(key.clone()).or_default().insert(uri.clone());
            self.function_prefixes.insert(key);
        }
        tracing::trace!("Cached component {} ({} functions)", uri.display(), component.functions.len());
        self.set_component(component);
    }

    fn remove_from_name_group(&mut self, name: &str, uri: &Path) {
        if let Some(group) = self.component_names.get_mut(name) {
            group.remove(uri);
            if group.is_empty() {
                self.component_names.remove(name);
                self.component_prefixes.remove(name);
            }
        }
    }

    fn unregister_function(&mut self, key: &str, uri: &Path) {
        if let Some(owners) = self.function_owners.get_mut(key) {
            owners.remove(uri);
            if owners.is_empty() {
                self.function_owners.remove(key);
                self.function_prefixes.remove(key);
            }
        }
    }

    /// Components whose name equals `name`, case-insensitively
    pub fn components_named(&self, name: &str) -> Vec<&Component> {
        self.component_names
            .get(&name.to_lowercase())
            .into_iter()
            .flatten()
            .filter_map(|uri| self.components.get(uri))
            .collect()
    }

    /// Components whose name starts with `prefix`, ordered by name
    pub fn search_components_by_prefix(&self, prefix: &str) -> Vec<&Component> {
        self.component_prefixes
            .with_prefix(prefix)
            .flat_map(|name| self.components_named(name))
            .collect()
    }

    /// Declared functions whose name starts with `prefix`, ordered by name
    /// and then by owning component
    pub fn search_functions_by_prefix(&self, prefix: &str) -> Vec<&UserFunction> {
        self.function_prefixes
            .with_prefix(prefix)
            .flat_map(|key| {
                self.function_owners
                    .get(key)
                    .into_iter()
                    .flatten()
                    .filter_map(move |uri| self.components.get(uri)?.functions.get(key))
            })
            .collect()
    }

    /// Identity of the cached component a dotted path refers to, trying the
    /// same candidates as file-system resolution
    pub fn resolve_dotted_path_to_cached_uri(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf> {
        self.layout
            .candidates(dotted_path, base_uri)
            .into_iter()
            .find_map(|candidate| self.get_component(&candidate).map(|component| component.uri.clone()))
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn set_application_variables(&mut self, uri: PathBuf, variables: Vec<Variable>) {
        self.application_variables.insert(uri, variables);
    }

    pub fn application_variables(&self, uri: &Path) -> Option<&[Variable]> {
        self.application_variables.get(uri).map(Vec::as_slice)
    }

    pub fn clear_application_variables(&mut self, uri: &Path) -> Option<Vec<Variable>> {
        self.application_variables.remove(uri)
    }

    /// Every cached `Application` file with its variables
    pub fn all_application_variables(&self) -> impl Iterator<Item = (&PathBuf, &Vec<Variable>)> {
        self.application_variables.iter()
    }

    pub fn set_server_variables(&mut self, uri: PathBuf, variables: Vec<Variable>) {
        self.server_variables.insert(uri, variables);
    }

    pub fn server_variables(&self, uri: &Path) -> Option<&[Variable]> {
        self.server_variables.get(uri).map(Vec::as_slice)
    }

    pub fn clear_server_variables(&mut self, uri: &Path) -> Option<Vec<Variable>> {
        self.server_variables.remove(uri)
    }

    pub fn all_server_variables(&self) -> impl Iterator<Item = (&PathBuf, &Vec<Variable>)> {
        self.server_variables.iter()
    }

    /// Reset every index; the layout is kept
    pub fn clear_all(&mut self) {
        self.components.clear();
        self.identities.clear();
        self.component_names.clear();
        self.component_prefixes.clear();
        self.function_owners.clear();
        self.function_prefixes.clear();
        self.application_variables.clear();
        self.server_variables.clear();
        tracing::debug!("Cleared entity cache");
    }
}

impl ComponentLocator for EntityCache {
    fn locate(&self, dotted_path: &str, base_uri: &Path) -> Option<PathBuf> {
        self.resolve_dotted_path_to_cached_uri(dotted_path, base_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Location, Range, Scope};

    fn function(name: &str) -> UserFunction {
        UserFunction {
            name: name.to_string(),
            ..UserFunction::default()
        }
    }

    fn component(uri: &str, functions: &[&str]) -> Component {
        let uri = PathBuf::from(uri);
        Component {
            name: uri.file_stem().unwrap().to_string_lossy().into_owned(),
            functions: functions.iter().map(|name| (name.to_lowercase(), function(name))).collect(),
            uri,
            ..Component::default()
        }
    }

    fn snapshot(cache: &EntityCache) -> String {
        let mut names: Vec<_> = cache.component_names.iter().collect();
        names.sort();
        let mut owners: Vec<_> = cache.function_owners.iter().collect();
        owners.sort();
        format!(
            "{:?}|{:?}|{:?}|{:?}|{:?}",
            cache.components.keys().collect::<Vec<_>>(),
            names,
            cache.component_prefixes,
            owners,
            cache.function_prefixes
        )
    }

    #[test]
    fn test_set_component_is_idempotent() {
        let mut cache = EntityCache::default();
        cache.set_component(component("/p/User.cfc", &["init"]));
        let once = snapshot(&cache);
        cache.set_component(component("/p/User.cfc", &["init"]));
        assert_eq!(snapshot(&cache), once);

        cache.cache_component(component("/p/User.cfc", &["init"]));
        let cached_once = snapshot(&cache);
        cache.cache_component(component("/p/User.cfc", &["init"]));
        assert_eq!(snapshot(&cache), cached_once);
    }

    #[test]
    fn test_removal_restores_previous_state() {
        let mut cache = EntityCache::default();
        cache.cache_component(component("/p/a/User.cfc", &["init", "save"]));
        let before = snapshot(&cache);

        cache.cache_component(component("/p/b/User.cfc", &["init", "load"]));
        cache.clear_component(Path::new("/p/b/User.cfc"));
        assert_eq!(snapshot(&cache), before);

        cache.clear_component(Path::new("/p/a/User.cfc"));
        assert_eq!(snapshot(&cache), snapshot(&EntityCache::default()));
        assert!(cache.clear_component(Path::new("/p/a/User.cfc")).is_none());
    }

    #[test]
    fn test_function_search_follows_cache_lifecycle() {
        let mut cache = EntityCache::default();
        cache.cache_component(component("/p/A.cfc", &["init", "index"]));
        cache.cache_component(component("/p/B.cfc", &["init"]));

        let names: Vec<_> = cache.search_functions_by_prefix("IN").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["index", "init", "init"]);

        cache.clear_component(Path::new("/p/A.cfc"));
        let names: Vec<_> = cache.search_functions_by_prefix("in").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["init"]);

        cache.clear_component(Path::new("/p/B.cfc"));
        assert!(cache.search_functions_by_prefix("in").is_empty());
    }

    #[test]
    fn test_replacing_component_drops_its_functions() {
        let mut cache = EntityCache::default();
        cache.cache_component(component("/p/A.cfc", &["init", "save"]));
        cache.set_component(component("/p/A.cfc", &["save"]));
        assert!(cache.search_functions_by_prefix("in").is_empty());
        assert_eq!(cache.search_functions_by_prefix("sa").len(), 1);

        cache.clear_component(Path::new("/p/A.cfc"));
        assert!(cache.search_functions_by_prefix("").is_empty());
        assert_eq!(snapshot(&cache), snapshot(&EntityCache::default()));
    }

    #[test]
    fn test_component_search_groups_by_name() {
        let mut cache = EntityCache::default();
        cache.set_component(component("/p/a/User.cfc", &[]));
        cache.set_component(component("/p/b/User.cfc", &[]));
        cache.set_component(component("/p/UserService.cfc", &[]));
        cache.set_component(component("/p/Order.cfc", &[]));

        let found: Vec<_> = cache
            .search_components_by_prefix("user")
            .iter()
            .map(|c| c.uri.to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["/p/a/User.cfc", "/p/b/User.cfc", "/p/UserService.cfc"]);
        assert_eq!(cache.components_named("ORDER").len(), 1);
    }

    #[test]
    fn test_resolve_dotted_path_against_cache() {
        let mut cache = EntityCache::new(ProjectLayout::new("/project"));
        cache.set_component(component("/project/models/User.cfc", &[]));
        cache.set_component(component("/project/handlers/Helper.cfc", &[]));

        let base = Path::new("/project/handlers/Main.cfc");
        assert_eq!(
            cache.resolve_dotted_path_to_cached_uri("Helper", base),
            Some(PathBuf::from("/project/handlers/Helper.cfc"))
        );
        assert_eq!(
            cache.locate("MODELS.user", base),
            Some(PathBuf::from("/project/models/User.cfc"))
        );
        assert_eq!(cache.resolve_dotted_path_to_cached_uri("models.Missing", base), None);
    }

    #[test]
    fn test_application_variables_and_clear_all() {
        let mut cache = EntityCache::default();
        let uri = PathBuf::from("/p/Application.cfc");
        let variable = Variable::new("dsn", Scope::Application, DataType::String, Location::new(uri.clone(), Range::default()));
        cache.set_application_variables(uri.clone(), vec![variable]);
        cache.cache_component(component("/p/Application.cfc", &["onRequestStart"]));

        assert_eq!(cache.application_variables(&uri).map(|v| v.len()), Some(1));
        cache.clear_all();
        assert!(cache.is_empty());
        assert!(cache.application_variables(&uri).is_none());
        assert!(cache.search_functions_by_prefix("").is_empty());
    }
}
