#![no_main]

use libfuzzer_sys::fuzz_target;
use saber_di::{CycleSearcher, DependencyGraph, Key, TypeRef, UnresolvedDependenciesSearcher};

fn key(id: u8) -> Key {
    Key::of(TypeRef::plain(format!("N{}", id % 32)))
}

fuzz_target!(|data: &[u8]| {
    // Each chunk is a node id followed by up to three dependency ids.
    let edges: Vec<(Key, Vec<Key>)> = data
        .chunks(4)
        .map(|chunk| (key(chunk[0]), chunk[1..].iter().map(|&d| key(d)).collect()))
        .collect();
    let graph = DependencyGraph::from_adjacency(edges);

    for unresolved in UnresolvedDependenciesSearcher::new(&graph).find_unresolved() {
        assert!(!graph.contains(&unresolved.key));
        assert!(graph.contains(&unresolved.required_by));
    }

    let cycles = CycleSearcher::new(&graph).find_cycles();
    for participant in &cycles {
        assert!(graph.contains(participant));
    }
    if graph.keys().all(|k| graph.dependencies(k).map_or(true, |d| d.is_empty())) {
        assert!(cycles.is_empty());
    }
});
