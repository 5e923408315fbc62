//! Cycle detection over a finished lineage graph.
//!
//! Catalog data is hand-written, so nothing stops `A` from claiming to derive
//! from `B` while `B` claims to derive from `A`. The builder never loops on
//! such input; this module reports it so callers can decide what to do
//! (see [`CyclePolicy`](crate::lineage::CyclePolicy)).
//!
//! Uses Kosaraju's algorithm: O(V + E).

use petgraph::algo::kosaraju_scc;

use crate::lineage::LineageGraph;

/// Find every derivation cycle in `graph`.
///
/// A cycle is either a strongly connected component with more than one node
/// or a single node deriving from itself. Members are listed in graph order,
/// and cycles are sorted by the position of their first member, so the
/// result is deterministic for a given input order.
pub fn find_cycles(graph: &LineageGraph) -> Vec<Vec<String>> {
    let dag = graph.digraph();

    let mut cycles: Vec<Vec<usize>> = kosaraju_scc(dag)
        .into_iter()
        .filter(|scc| scc.len() > 1 || dag.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<usize> = scc.into_iter().map(|idx| idx.index()).collect();
            members.sort_unstable();
            members
        })
        .collect();

    cycles.sort_by_key(|members| members[0]);

    cycles
        .into_iter()
        .map(|members| {
            members
                .into_iter()
                .map(|position| graph.nodes()[position].id.clone())
                .collect()
        })
        .collect()
}
