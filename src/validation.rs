//! Graph validation: turns a built graph into a [`ValidatedGraph`] or an
//! aggregate [`ValidationFailure`].

use std::ops::Deref;

use tracing::{debug, warn};

use crate::config::ProcessorConfig;
use crate::descriptors::InjectionTargetDescriptor;
use crate::error::{Diagnostic, ErrorKind, ValidationFailure};
use crate::graph::{CycleSearcher, DependencyGraph, UnresolvedDependenciesSearcher};
use crate::key::Key;

/// A dependency graph that passed every check.
///
/// Only [`GraphValidator::validate`] creates one, so anything taking a
/// `ValidatedGraph` cannot run over a graph with known problems.
#[derive(Debug)]
pub struct ValidatedGraph {
    graph: DependencyGraph,
}

impl ValidatedGraph {
    pub fn into_inner(self) -> DependencyGraph {
        self.graph
    }
}

impl Deref for ValidatedGraph {
    type Target = DependencyGraph;

    fn deref(&self) -> &DependencyGraph {
        &self.graph
    }
}

/// Runs every check over a graph and its injection targets.
///
/// All problems are collected before deciding. Diagnostics already found
/// while building the graph (duplicate providers) are passed in and reported
/// first.
///
/// # Examples
///
/// ```
/// use saber_di::{DependencyGraph, ErrorKind, GraphValidator, Key, ProcessorConfig, TypeRef};
///
/// let a = Key::of(TypeRef::plain("A"));
/// let b = Key::of(TypeRef::plain("B"));
/// let graph = DependencyGraph::from_adjacency([
///     (a.clone(), vec![b.clone()]),
///     (b.clone(), vec![a.clone()]),
/// ]);
///
/// let config = ProcessorConfig::default();
/// let failure = GraphValidator::new(&config).validate(graph, Vec::new()).unwrap_err();
/// assert_eq!(failure.count(ErrorKind::CyclicDependency), 2);
/// ```
pub struct GraphValidator<'a> {
    config: &'a ProcessorConfig,
    targets: &'a [InjectionTargetDescriptor],
}

impl<'a> GraphValidator<'a> {
    pub fn new(config: &'a ProcessorConfig) -> Self {
        Self { config, targets: &[] }
    }

    pub fn with_targets(mut self, targets: &'a [InjectionTargetDescriptor]) -> Self {
        self.targets = targets;
        self
    }

    pub fn validate(
        &self,
        graph: DependencyGraph,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Result<ValidatedGraph, ValidationFailure> {
        diagnostics.extend(unresolved_diagnostics(&graph));
        diagnostics.extend(cycle_diagnostics(&graph));
        diagnostics.extend(target_diagnostics(&graph, self.targets));

        if diagnostics.is_empty() {
            debug!(nodes = graph.len(), "Dependency graph is valid");
            return Ok(ValidatedGraph { graph });
        }

        if self.config.log_diagnostics {
            for diagnostic in &diagnostics {
                warn!(
                    key = %diagnostic.key,
                    kind = %diagnostic.kind,
                    location = %diagnostic.location,
                    "Dependency graph problem"
                );
            }
        }
        let omitted = match self.config.max_reported_diagnostics {
            Some(limit) if diagnostics.len() > limit => {
                let omitted = diagnostics.len() - limit;
                diagnostics.truncate(limit);
                omitted
            }
            _ => 0,
        };
        Err(ValidationFailure { diagnostics, omitted })
    }
}

fn location_of(graph: &DependencyGraph, key: &Key) -> String {
    graph
        .node(key)
        .map_or_else(|| key.to_string(), |node| node.location())
}

fn unresolved_diagnostics(graph: &DependencyGraph) -> Vec<Diagnostic> {
    UnresolvedDependenciesSearcher::new(graph)
        .find_unresolved()
        .into_iter()
        .map(|unresolved| {
            let location = location_of(graph, &unresolved.required_by);
            Diagnostic::new(unresolved.key, ErrorKind::UnresolvedDependency, location)
        })
        .collect()
}

fn cycle_diagnostics(graph: &DependencyGraph) -> Vec<Diagnostic> {
    CycleSearcher::new(graph)
        .find_cycles()
        .into_iter()
        .map(|key| {
            let location = location_of(graph, &key);
            Diagnostic::new(key, ErrorKind::CyclicDependency, location)
        })
        .collect()
}

fn target_diagnostics(graph: &DependencyGraph, targets: &[InjectionTargetDescriptor]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for target in targets {
        for (location, key) in target.requirements() {
            let needed = key.unwrap_deferred().unwrap_or_else(|| key.clone());
            if !graph.contains(&needed) {
                diagnostics.push(Diagnostic::new(needed, ErrorKind::UnresolvedDependency, location));
            }
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::InjectionTargetDescriptor;
    use crate::types::TypeRef;

    fn key(name: &str) -> Key {
        Key::of(TypeRef::plain(name))
    }

    #[test]
    fn quiet_configuration_still_rejects_invalid_graphs() {
        let graph = DependencyGraph::from_adjacency([(key("A"), vec![key("A")]), (key("B"), vec![key("C")])]);
        let config = ProcessorConfig {
            log_diagnostics: false,
            max_reported_diagnostics: Some(0),
        };

        let failure = GraphValidator::new(&config).validate(graph, Vec::new()).unwrap_err();
        assert!(failure.diagnostics.is_empty());
        assert_eq!(failure.omitted, 2);
    }

    #[test]
    fn injection_targets_need_provided_keys() {
        let graph = DependencyGraph::from_adjacency([(key("Engine"), vec![])]);
        let targets = vec![InjectionTargetDescriptor::new(TypeRef::plain("Garage"))
            .field("engine", key("Engine"))
            .field("wheels", key("Wheels"))
            .field("lazy_engine", Key::of(TypeRef::lazy_of(TypeRef::plain("Engine"))))];
        let config = ProcessorConfig::default();

        let failure = GraphValidator::new(&config)
            .with_targets(&targets)
            .validate(graph, Vec::new())
            .unwrap_err();

        assert_eq!(failure.diagnostics.len(), 1);
        assert_eq!(failure.diagnostics[0].key, key("Wheels"));
        assert_eq!(failure.diagnostics[0].location, "Garage::wheels");
    }

    #[test]
    fn report_is_truncated_but_still_fails() {
        let graph = DependencyGraph::from_adjacency([(key("A"), vec![key("B"), key("C"), key("D")])]);
        let config = ProcessorConfig {
            max_reported_diagnostics: Some(1),
            ..ProcessorConfig::default()
        };

        let failure = GraphValidator::new(&config).validate(graph, Vec::new()).unwrap_err();
        assert_eq!(failure.diagnostics.len(), 1);
        assert_eq!(failure.omitted, 2);
        assert!(failure.to_string().ends_with("... and 2 more"));
    }
}
