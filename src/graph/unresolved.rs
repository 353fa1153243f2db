//! Completeness check: every reachable dependency must be provided.

use ahash::AHashSet;

use crate::graph::DependencyGraph;
use crate::key::Key;

/// A key that something depends on but nothing provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependency {
    pub key: Key,
    /// The first provider found to need it
    pub required_by: Key,
}

/// Depth-first search for dependencies without a provider.
///
/// Every node is a root. A key that is visited but has no entry in the graph
/// is unresolved; a key with an empty entry is fine. Keys nobody references
/// are never visited, so they are never reported. Deferred dependencies are
/// followed too: they are constructed later, but must still exist.
///
/// # Examples
///
/// ```
/// use saber_di::{DependencyGraph, Key, TypeRef, UnresolvedDependenciesSearcher};
///
/// let a = Key::of(TypeRef::plain("A"));
/// let b = Key::of(TypeRef::plain("B"));
/// let graph = DependencyGraph::from_adjacency([(a.clone(), vec![b.clone()])]);
///
/// let unresolved = UnresolvedDependenciesSearcher::new(&graph).find_unresolved();
/// assert_eq!(unresolved.len(), 1);
/// assert_eq!(unresolved[0].key, b);
/// assert_eq!(unresolved[0].required_by, a);
/// ```
pub struct UnresolvedDependenciesSearcher<'g> {
    graph: &'g DependencyGraph,
    visited: AHashSet<&'g Key>,
    unresolved: Vec<UnresolvedDependency>,
}

impl<'g> UnresolvedDependenciesSearcher<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            visited: AHashSet::new(),
            unresolved: Vec::new(),
        }
    }

    /// Unresolved keys in the order they were first encountered.
    pub fn find_unresolved(mut self) -> Vec<UnresolvedDependency> {
        let graph = self.graph;
        for key in graph.keys() {
            self.visit(key);
        }
        self.unresolved
    }

    /// Just the keys, in first-encountered order.
    pub fn find_unresolved_keys(self) -> Vec<Key> {
        self.find_unresolved().into_iter().map(|u| u.key).collect()
    }

    // Pre-order DFS on an explicit stack; dependencies are pushed in reverse
    // so they pop in declaration order.
    fn visit(&mut self, root: &'g Key) {
        let graph = self.graph;
        let mut stack = vec![(root, root)];

        while let Some((key, required_by)) = stack.pop() {
            if !self.visited.insert(key) {
                continue;
            }
            match graph.node(key) {
                None => self.unresolved.push(UnresolvedDependency {
                    key: key.clone(),
                    required_by: required_by.clone(),
                }),
                Some(node) => {
                    let dependencies: Vec<&'g Key> = node.all_dependencies().collect();
                    stack.extend(dependencies.into_iter().rev().map(|dependency| (dependency, key)));
                }
            }
        }
    }
}
