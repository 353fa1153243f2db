//! Wiring output: construction instructions for a code generator.

use ahash::AHashSet;

use crate::descriptors::{ProviderOrigin, ScopeKind};
use crate::graph::GraphNode;
use crate::key::Key;
use crate::validation::ValidatedGraph;

/// How to construct one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringInstruction {
    pub key: Key,
    /// Instances to pass in, already constructed earlier in the plan
    pub dependencies: Vec<Key>,
    /// Keys to pass in as `Provider<T>` / `Lazy<T>` handles
    pub deferred: Vec<Key>,
    pub scope: Option<ScopeKind>,
    pub origin: Option<ProviderOrigin>,
}

impl WiringInstruction {
    /// Whether the generated provider should be wrapped in a
    /// [`SingletonProvider`](crate::SingletonProvider).
    pub fn is_singleton(&self) -> bool {
        self.scope == Some(ScopeKind::Singleton)
    }
}

/// Construction order for a validated graph.
///
/// Every instruction comes after the instructions for its eager
/// dependencies. Deferred dependencies impose no order. Ties follow the order
/// providers were added, so the plan is deterministic. [`Key::injector`] is
/// supplied by the injector itself and never gets an instruction.
///
/// # Examples
///
/// ```
/// use saber_di::{Key, ModuleDescriptor, ProcessorConfig, Processor, TypeRef};
///
/// let engine = Key::of(TypeRef::plain("Engine"));
/// let car = Key::of(TypeRef::plain("Car"));
/// let module = ModuleDescriptor::new("CarModule")
///     .provides("provide_car", car.clone(), [engine.clone()])
///     .provides("provide_engine", engine.clone(), []);
///
/// let output = Processor::new(ProcessorConfig::default()).add_module(module).process().unwrap();
/// let order: Vec<_> = output.plan.iter().map(|i| i.key.clone()).collect();
/// assert_eq!(order, vec![engine, car]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WiringPlan {
    instructions: Vec<WiringInstruction>,
}

impl WiringPlan {
    pub fn from_graph(graph: &ValidatedGraph) -> Self {
        let mut planner = Planner {
            graph,
            injector: Key::injector(),
            placed: AHashSet::new(),
            instructions: Vec::with_capacity(graph.len()),
        };
        for key in graph.keys() {
            planner.place(key);
        }
        Self {
            instructions: planner.instructions,
        }
    }

    pub fn instructions(&self) -> &[WiringInstruction] {
        &self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WiringInstruction> {
        self.instructions.iter()
    }

    pub fn position(&self, key: &Key) -> Option<usize> {
        self.instructions.iter().position(|i| &i.key == key)
    }

    pub fn singletons(&self) -> impl Iterator<Item = &WiringInstruction> {
        self.instructions.iter().filter(|i| i.is_singleton())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<'a> IntoIterator for &'a WiringPlan {
    type Item = &'a WiringInstruction;
    type IntoIter = std::slice::Iter<'a, WiringInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

struct Planner<'g> {
    graph: &'g ValidatedGraph,
    injector: Key,
    placed: AHashSet<&'g Key>,
    instructions: Vec<WiringInstruction>,
}

impl<'g> Planner<'g> {
    // The graph is acyclic over eager edges, so plain post-order suffices.
    // The walk keeps its own stack; chain depth is not limited by recursion.
    fn place(&mut self, root: &'g Key) {
        let mut stack: Vec<(&'g Key, &'g GraphNode, usize)> = Vec::new();
        if let Some(node) = self.enter(root) {
            stack.push((root, node, 0));
        }

        while let Some(top) = stack.last_mut() {
            let (key, node, next) = *top;
            if let Some(dependency) = node.eager.get(next) {
                top.2 += 1;
                if let Some(child) = self.enter(dependency) {
                    stack.push((dependency, child, 0));
                }
                continue;
            }
            stack.pop();
            self.instructions.push(WiringInstruction {
                key: key.clone(),
                dependencies: node.eager.to_vec(),
                deferred: node.deferred.to_vec(),
                scope: node.scope.clone(),
                origin: node.origin.clone(),
            });
        }
    }

    /// Marks `key` placed, returning its node if it still needs an instruction.
    fn enter(&mut self, key: &'g Key) -> Option<&'g GraphNode> {
        if *key == self.injector || !self.placed.insert(key) {
            return None;
        }
        let graph = self.graph;
        graph.node(key)
    }
}
