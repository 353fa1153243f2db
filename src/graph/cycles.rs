//! Cycle detection over eager dependency edges.

use ahash::{AHashMap, AHashSet};

use crate::graph::DependencyGraph;
use crate::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the current DFS path
    Gray,
    /// Fully explored
    Black,
}

/// Three-color DFS that identifies keys taking part in dependency cycles.
///
/// Only eager edges count: a `Provider<T>` or `Lazy<T>` dependency does not
/// construct `T` while its owner is being built. Missing entries are treated
/// as having no edges; reporting those is the unresolved pass's job.
///
/// The result names participants only, not full cycle paths. When an edge
/// reaches a gray key, that key and every key after it on the current path
/// are participants.
///
/// # Examples
///
/// ```
/// use saber_di::{CycleSearcher, DependencyGraph, Key, TypeRef};
///
/// let a = Key::of(TypeRef::plain("A"));
/// let b = Key::of(TypeRef::plain("B"));
/// let graph = DependencyGraph::from_adjacency([
///     (a.clone(), vec![b.clone()]),
///     (b.clone(), vec![a.clone()]),
/// ]);
///
/// assert_eq!(CycleSearcher::new(&graph).find_cycles(), vec![a, b]);
/// ```
pub struct CycleSearcher<'g> {
    graph: &'g DependencyGraph,
    colors: AHashMap<&'g Key, Color>,
    path: Vec<Frame<'g>>,
    seen: AHashSet<&'g Key>,
    participants: Vec<Key>,
}

/// A key on the current DFS path and the index of its next edge to follow.
struct Frame<'g> {
    key: &'g Key,
    next: usize,
}

impl<'g> CycleSearcher<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            colors: AHashMap::new(),
            path: Vec::new(),
            seen: AHashSet::new(),
            participants: Vec::new(),
        }
    }

    /// Cycle participants in the order they were found.
    pub fn find_cycles(mut self) -> Vec<Key> {
        let graph = self.graph;
        for key in graph.keys() {
            if !self.colors.contains_key(key) {
                self.visit(key);
            }
        }
        self.participants
    }

    // Iterative so that chain depth is bounded by the heap, not the stack.
    fn visit(&mut self, root: &'g Key) {
        let graph = self.graph;
        self.enter(root);

        while let Some(frame) = self.path.last_mut() {
            let dependencies = graph.dependencies(frame.key).unwrap_or(&[]);
            let Some(dependency) = dependencies.get(frame.next) else {
                if let Some(done) = self.path.pop() {
                    self.colors.insert(done.key, Color::Black);
                }
                continue;
            };
            frame.next += 1;

            match self.colors.get(dependency).copied() {
                Some(Color::Gray) => self.record_cycle(dependency),
                Some(Color::Black) => {}
                None => self.enter(dependency),
            }
        }
    }

    fn enter(&mut self, key: &'g Key) {
        self.colors.insert(key, Color::Gray);
        self.path.push(Frame { key, next: 0 });
    }

    fn record_cycle(&mut self, entry: &'g Key) {
        let start = self.path.iter().rposition(|f| f.key == entry).unwrap_or(0);
        for frame in &self.path[start..] {
            if self.seen.insert(frame.key) {
                self.participants.push(frame.key.clone());
            }
        }
    }
}
