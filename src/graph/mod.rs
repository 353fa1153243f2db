//! Dependency graph construction.
//!
//! The graph maps each providable key to the keys its provider needs. It is
//! built once per processing run from the analyzed modules and is read-only
//! afterwards; [`unresolved`] and [`cycles`] run over it as independent
//! validation passes.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::descriptors::{ModuleDescriptor, ProviderDescriptor, ProviderOrigin, ScopeKind};
use crate::error::{Diagnostic, ErrorKind};
use crate::internal::AppendMap;
use crate::key::Key;

pub mod cycles;
pub mod unresolved;

pub use cycles::CycleSearcher;
pub use unresolved::{UnresolvedDependenciesSearcher, UnresolvedDependency};

/// A node of the dependency graph: one provider for one key.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Dependencies constructed together with the node
    pub eager: SmallVec<[Key; 4]>,
    /// Targets of `Provider<T>` / `Lazy<T>` dependencies, resolved on demand
    pub deferred: SmallVec<[Key; 2]>,
    pub scope: Option<ScopeKind>,
    pub origin: Option<ProviderOrigin>,
}

impl GraphNode {
    /// Eager and deferred dependencies together.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &Key> {
        self.eager.iter().chain(self.deferred.iter())
    }

    pub fn location(&self) -> String {
        self.origin
            .as_ref()
            .map_or_else(|| "<graph>".to_string(), ToString::to_string)
    }
}

/// Adjacency list from providable key to dependency keys.
///
/// A key with an entry and an empty dependency list is provided with no
/// dependencies; a key without an entry is not provided at all.
///
/// # Examples
///
/// ```
/// use saber_di::{DependencyGraph, Key, TypeRef};
///
/// let a = Key::of(TypeRef::plain("A"));
/// let b = Key::of(TypeRef::plain("B"));
/// let graph = DependencyGraph::from_adjacency([(a.clone(), vec![b.clone()])]);
///
/// assert_eq!(graph.dependencies(&a), Some(&[b.clone()][..]));
/// assert_eq!(graph.dependencies(&b), None);
/// ```
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: AppendMap<Key, GraphNode>,
}

impl DependencyGraph {
    /// Builds a graph straight from `key -> dependencies` pairs. Later
    /// duplicates of a key are ignored.
    pub fn from_adjacency<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Key, Vec<Key>)>,
    {
        let mut nodes = AppendMap::new();
        for (key, dependencies) in edges {
            let node = GraphNode {
                eager: dependencies.into_iter().collect(),
                deferred: SmallVec::new(),
                scope: None,
                origin: None,
            };
            let _ = nodes.insert(key, node);
        }
        Self { nodes }
    }

    /// Eager dependency keys of `key`, or `None` if nothing provides it.
    pub fn dependencies(&self, key: &Key) -> Option<&[Key]> {
        self.nodes.get(key).map(|node| node.eager.as_slice())
    }

    pub fn node(&self, key: &Key) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.nodes.contains_key(key)
    }

    /// Nodes in the order their providers were added.
    pub fn nodes(&self) -> impl Iterator<Item = (&Key, &GraphNode)> {
        self.nodes.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.nodes.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.eager.len() + n.deferred.len()).sum()
    }

    /// Exports the graph as JSON for tooling.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> serde_json::Value {
        let nodes: Vec<serde_json::Value> = self
            .nodes()
            .map(|(key, node)| {
                serde_json::json!({
                    "key": key.to_string(),
                    "origin": node.origin.as_ref().map(ToString::to_string),
                    "scope": node.scope.as_ref().map(ToString::to_string),
                    "dependencies": node.eager.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "deferred": node.deferred.iter().map(ToString::to_string).collect::<Vec<_>>(),
                })
            })
            .collect();
        serde_json::json!({ "nodes": nodes })
    }
}

/// Collects provider declarations into a [`DependencyGraph`].
///
/// Problems are accumulated rather than returned early so that a single run
/// reports all of them.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    nodes: AppendMap<Key, GraphNode>,
    diagnostics: Vec<Diagnostic>,
}

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every provider declared by a module.
    pub fn add_module(&mut self, module: &ModuleDescriptor) -> &mut Self {
        debug!(module = %module.name, providers = module.providers.len(), "Adding module to dependency graph");
        for provider in &module.providers {
            self.add_provider(provider);
        }
        self
    }

    /// Adds one provider. A second provider for an already provided key is
    /// reported as [`ErrorKind::DuplicateProvider`] and otherwise ignored.
    ///
    /// A key whose type mentions a wildcard or type variable cannot be built
    /// by a concrete factory; it is reported as
    /// [`ErrorKind::NonConcreteProvider`] but still enters the graph so its
    /// dependents are not reported as unresolved too.
    pub fn add_provider(&mut self, provider: &ProviderDescriptor) -> &mut Self {
        if !provider.key.type_ref().is_concrete() {
            warn!(key = %provider.key, location = %provider.origin, "Provider for a non-concrete type");
            self.diagnostics.push(Diagnostic::new(
                provider.key.clone(),
                ErrorKind::NonConcreteProvider,
                provider.origin.to_string(),
            ));
        }

        let mut eager = SmallVec::new();
        let mut deferred = SmallVec::new();
        for dependency in provider.dependencies() {
            match dependency.unwrap_deferred() {
                Some(target) => deferred.push(target),
                None => eager.push(dependency.clone()),
            }
        }

        let node = GraphNode {
            eager,
            deferred,
            scope: provider.scope.clone(),
            origin: Some(provider.origin.clone()),
        };
        if let Err((key, rejected)) = self.nodes.insert(provider.key.clone(), node) {
            let previous = self.nodes.get(&key).map(GraphNode::location).unwrap_or_default();
            warn!(key = %key, location = %rejected.location(), previous = %previous, "Duplicate provider");
            self.diagnostics
                .push(Diagnostic::new(key, ErrorKind::DuplicateProvider, rejected.location()));
        }
        self
    }

    /// Finishes the graph, handing back the problems found while building it.
    ///
    /// Every injector provides itself, so the graph always gains an empty
    /// entry for [`Key::injector`]. A module providing that key is reported
    /// as a duplicate.
    pub fn build(mut self) -> (DependencyGraph, Vec<Diagnostic>) {
        let injector = Key::injector();
        let builtin = GraphNode {
            eager: SmallVec::new(),
            deferred: SmallVec::new(),
            scope: None,
            origin: None,
        };
        if let Err((key, _)) = self.nodes.insert(injector, builtin) {
            let location = self.nodes.get(&key).map(GraphNode::location).unwrap_or_default();
            warn!(key = %key, location = %location, "Provider for the injector itself");
            self.diagnostics
                .push(Diagnostic::new(key, ErrorKind::DuplicateProvider, location));
        }

        let graph = DependencyGraph { nodes: self.nodes };
        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            problems = self.diagnostics.len(),
            "Built dependency graph"
        );
        (graph, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    fn key(name: &str) -> Key {
        Key::of(TypeRef::plain(name))
    }

    #[test]
    fn zero_argument_provider_has_an_empty_entry() {
        let module = ModuleDescriptor::new("M").provides("provide_a", key("A"), []);
        let mut builder = DependencyGraphBuilder::new();
        builder.add_module(&module);
        let (graph, problems) = builder.build();

        assert!(problems.is_empty());
        assert_eq!(graph.dependencies(&key("A")), Some(&[][..]));
    }

    #[test]
    fn duplicate_key_in_module_is_reported_and_building_continues() {
        let module = ModuleDescriptor::new("M")
            .provides("first", key("A"), [])
            .provides("second", key("A"), [key("B")])
            .provides("third", key("C"), []);
        let mut builder = DependencyGraphBuilder::new();
        builder.add_module(&module);
        let (graph, problems) = builder.build();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ErrorKind::DuplicateProvider);
        assert_eq!(problems[0].location, "M::second");
        // the first declaration is kept
        assert_eq!(graph.dependencies(&key("A")), Some(&[][..]));
        assert!(graph.contains(&key("C")));
    }

    #[test]
    fn non_concrete_provided_types_are_reported() {
        let list_of_t = Key::of(TypeRef::parameterized(TypeRef::plain("List"), vec![TypeRef::variable("T")]));
        let module = ModuleDescriptor::new("M")
            .provides("list", list_of_t.clone(), [])
            .provides("user", key("User"), [list_of_t.clone()]);
        let mut builder = DependencyGraphBuilder::new();
        builder.add_module(&module);
        let (graph, problems) = builder.build();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ErrorKind::NonConcreteProvider);
        assert_eq!(problems[0].key, list_of_t);
        assert_eq!(problems[0].location, "M::list");
        assert!(graph.contains(&list_of_t));
    }

    #[test]
    fn injector_key_is_always_provided() {
        let (graph, problems) = DependencyGraphBuilder::new().build();
        assert!(problems.is_empty());
        assert_eq!(graph.dependencies(&Key::injector()), Some(&[][..]));
    }

    #[test]
    fn module_providing_the_injector_is_a_duplicate() {
        let mut builder = DependencyGraphBuilder::new();
        builder.add_module(&ModuleDescriptor::new("M").provides("injector", Key::injector(), []));
        let (_, problems) = builder.build();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ErrorKind::DuplicateProvider);
        assert_eq!(problems[0].location, "M::injector");
    }

    #[test]
    fn deferred_dependencies_are_unwrapped() {
        let lazy_engine = Key::of(TypeRef::lazy_of(TypeRef::plain("Engine")));
        let module = ModuleDescriptor::new("M").provides("car", key("Car"), [lazy_engine, key("Wheel")]);
        let mut builder = DependencyGraphBuilder::new();
        builder.add_module(&module);
        let (graph, _) = builder.build();

        let node = graph.node(&key("Car")).unwrap();
        assert_eq!(node.eager.as_slice(), &[key("Wheel")]);
        assert_eq!(node.deferred.as_slice(), &[key("Engine")]);
        assert_eq!(graph.edge_count(), 2);
    }
}
