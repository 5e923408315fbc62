//! Lineage graph builder.
//!
//! Turns a flat list of [`DistroRecord`]s into a deduplicated derivation
//! graph in a single pass:
//!
//! ```text
//! records (input order) -> GraphBuilder -> LineageGraph (immutable snapshot)
//! ```
//!
//! # Guarantees
//!
//! - **Unique ids**: one node per distribution, however often it is mentioned.
//! - **No dangling edges**: every edge endpoint is in the node set, and every
//!   edge target is a real record.
//! - **Order-stable**: nodes appear in first-mention order, so the same input
//!   order always yields the same graph.
//! - **In-place upgrade**: a base referenced before its own record appears is
//!   first created as a synthetic node and later filled in with the record's
//!   metadata, keeping its position.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::cycles::find_cycles;
use crate::error::{LineageError, Result};
use crate::types::DistroRecord;

/// What to do when the derived-from relation contains a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Keep cyclic edges as they are (self-loops included).
    #[default]
    Accept,
    /// Fail the build with [`LineageError::CycleDetected`].
    Reject,
}

impl FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept" => Ok(CyclePolicy::Accept),
            "reject" => Ok(CyclePolicy::Reject),
            _ => Err(format!("Unknown cycle policy: '{}'", s)),
        }
    }
}

/// Knobs for [`build_with`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Treat `"debian"` and `"Debian"` as the same distribution.
    pub case_insensitive: bool,
    pub cycle_policy: CyclePolicy,
}

impl BuildOptions {
    /// Builder: enable case-insensitive name matching.
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Builder: set the cycle policy.
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }
}

/// A distinct distribution in the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageNode {
    /// Distribution name; unique within a graph.
    pub id: String,
    /// Description of the distribution, or its name when none is known.
    pub label: String,
    /// `true` when no record with this name exists in the input.
    pub is_synthetic: bool,
    /// The record this node was built from (absent for synthetic nodes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<DistroRecord>,
}

impl LineageNode {
    fn real(record: &DistroRecord) -> Self {
        let id = record.key_name().to_string();
        let label = record
            .description
            .clone()
            .unwrap_or_else(|| id.clone());
        Self {
            id,
            label,
            is_synthetic: false,
            record: Some(record.clone()),
        }
    }

    fn synthetic(name: &str) -> Self {
        Self {
            id: name.to_string(),
            label: name.to_string(),
            is_synthetic: true,
            record: None,
        }
    }
}

/// A "derived from" relation, parent to child.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LineageEdge {
    pub from: String,
    pub to: String,
}

/// Counters collected while building.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub records: usize,
    pub real_nodes: usize,
    pub synthetic_nodes: usize,
    /// Synthetic nodes later filled in by their own record.
    pub upgraded: usize,
    /// Records whose name was already taken by an earlier record.
    pub duplicate_records: usize,
    /// Edges skipped because the same pair was already present.
    pub duplicate_edges: usize,
    pub self_loops: usize,
}

/// Immutable derivation graph produced by [`build`].
///
/// The derived-from relation lives in a petgraph `DiGraph` whose node index
/// `i` is `nodes[i]`; edges point from base to derivative.
#[derive(Clone, Debug)]
pub struct LineageGraph {
    nodes: Vec<LineageNode>,
    edges: Vec<LineageEdge>,
    graph: DiGraph<(), ()>,
    index: HashMap<String, NodeIndex>,
    case_insensitive: bool,
    report: BuildReport,
}

impl PartialEq for LineageGraph {
    fn eq(&self, other: &Self) -> bool {
        // `edges` mirrors the DiGraph in insertion order
        self.nodes == other.nodes
            && self.edges == other.edges
            && self.case_insensitive == other.case_insensitive
            && self.report == other.report
    }
}

impl Eq for LineageGraph {}

/// Build a lineage graph with default options.
pub fn build(records: &[DistroRecord]) -> Result<LineageGraph> {
    build_with(records, &BuildOptions::default())
}

/// Build a lineage graph.
///
/// Fails with [`LineageError::MalformedRecord`] on the first record whose
/// name is blank; nothing is returned in that case.
pub fn build_with(records: &[DistroRecord], options: &BuildOptions) -> Result<LineageGraph> {
    let mut builder = GraphBuilder::new(options, records.len());

    for (position, record) in records.iter().enumerate() {
        if record.key_name().is_empty() {
            return Err(LineageError::malformed(position, "name is blank"));
        }

        let child = builder.ensure_real(record);
        if let Some(base) = record.base() {
            let parent = builder.ensure_synthetic(base);
            builder.link(parent, child);
        }
    }

    let graph = builder.finish()?;

    let cycles = find_cycles(&graph);
    if !cycles.is_empty() {
        match options.cycle_policy {
            CyclePolicy::Reject => return Err(LineageError::CycleDetected { cycles }),
            CyclePolicy::Accept => {
                tracing::debug!("Accepting {} derivation cycle(s)", cycles.len());
            }
        }
    }

    tracing::debug!(
        "Built lineage graph: {} records, {} nodes ({} synthetic), {} edges",
        graph.report.records,
        graph.nodes.len(),
        graph.report.synthetic_nodes,
        graph.edges.len()
    );

    Ok(graph)
}

fn normalize(name: &str, case_insensitive: bool) -> String {
    let trimmed = name.trim();
    if case_insensitive {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Mutable state of one build pass. Edges go into the DiGraph as node
/// indices, so an upgraded node can change its spelling without rewiring.
struct GraphBuilder<'a> {
    options: &'a BuildOptions,
    nodes: Vec<LineageNode>,
    graph: DiGraph<(), ()>,
    index: HashMap<String, NodeIndex>,
    seen_edges: HashSet<(NodeIndex, NodeIndex)>,
    report: BuildReport,
}

impl<'a> GraphBuilder<'a> {
    fn new(options: &'a BuildOptions, capacity: usize) -> Self {
        Self {
            options,
            nodes: Vec::with_capacity(capacity),
            graph: DiGraph::with_capacity(capacity, capacity),
            index: HashMap::with_capacity(capacity),
            seen_edges: HashSet::with_capacity(capacity),
            report: BuildReport::default(),
        }
    }

    fn key(&self, name: &str) -> String {
        normalize(name, self.options.case_insensitive)
    }

    fn ensure_real(&mut self, record: &DistroRecord) -> NodeIndex {
        self.report.records += 1;
        let key = self.key(&record.name);

        match self.index.get(&key).copied() {
            None => self.push(key, LineageNode::real(record)),
            Some(idx) => {
                let node = &mut self.nodes[idx.index()];
                if node.is_synthetic {
                    *node = LineageNode::real(record);
                    self.report.upgraded += 1;
                } else {
                    tracing::warn!(
                        "Duplicate record '{}' ignored; keeping the first definition",
                        record.key_name()
                    );
                    self.report.duplicate_records += 1;
                }
                idx
            }
        }
    }

    fn ensure_synthetic(&mut self, name: &str) -> NodeIndex {
        let key = self.key(name);
        match self.index.get(&key).copied() {
            Some(idx) => idx,
            None => self.push(key, LineageNode::synthetic(name.trim())),
        }
    }

    fn push(&mut self, key: String, node: LineageNode) -> NodeIndex {
        let idx = self.graph.add_node(());
        self.nodes.push(node);
        self.index.insert(key, idx);
        idx
    }

    fn link(&mut self, parent: NodeIndex, child: NodeIndex) {
        if !self.seen_edges.insert((parent, child)) {
            self.report.duplicate_edges += 1;
            return;
        }
        if parent == child {
            self.report.self_loops += 1;
        }
        self.graph.add_edge(parent, child, ());
    }

    fn finish(self) -> Result<LineageGraph> {
        let GraphBuilder {
            options,
            nodes,
            graph,
            index,
            mut report,
            ..
        } = self;

        let mut edges = Vec::with_capacity(graph.edge_count());

        for edge in graph.edge_references() {
            let (parent, child) = (edge.source().index(), edge.target().index());
            let (Some(from), Some(to)) = (nodes.get(parent), nodes.get(child)) else {
                return Err(LineageError::DanglingEdge {
                    from: nodes.get(parent).map(|n| n.id.clone()).unwrap_or_default(),
                    to: nodes.get(child).map(|n| n.id.clone()).unwrap_or_default(),
                });
            };
            if to.is_synthetic {
                return Err(LineageError::DanglingEdge {
                    from: from.id.clone(),
                    to: to.id.clone(),
                });
            }

            edges.push(LineageEdge {
                from: from.id.clone(),
                to: to.id.clone(),
            });
        }

        report.synthetic_nodes = nodes.iter().filter(|n| n.is_synthetic).count();
        report.real_nodes = nodes.len() - report.synthetic_nodes;

        Ok(LineageGraph {
            nodes,
            edges,
            graph,
            index,
            case_insensitive: options.case_insensitive,
            report,
        })
    }
}

impl LineageGraph {
    /// All nodes in first-mention order.
    pub fn nodes(&self) -> &[LineageNode] {
        &self.nodes
    }

    /// All edges in the order they were first seen.
    pub fn edges(&self) -> &[LineageEdge] {
        &self.edges
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by name, using the same matching rules as the build.
    pub fn node(&self, id: &str) -> Option<&LineageNode> {
        self.node_index(id).map(|idx| &self.nodes[idx.index()])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index(id).is_some()
    }

    /// The base this distribution was first recorded as deriving from.
    pub fn parent(&self, id: &str) -> Option<&LineageNode> {
        let idx = self.node_index(id)?;
        self.parent_index(idx).map(|p| &self.nodes[p.index()])
    }

    /// Distributions derived directly from `id`, in the order they were linked.
    pub fn children(&self, id: &str) -> Vec<&LineageNode> {
        let Some(idx) = self.node_index(id) else {
            return Vec::new();
        };

        // petgraph lists neighbors newest edge first
        let mut children: Vec<&LineageNode> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|c| &self.nodes[c.index()])
            .collect();
        children.reverse();
        children
    }

    /// Walk the derived-from chain starting at `id` (inclusive) up to its root.
    ///
    /// Stops before revisiting a node, so cyclic chains terminate.
    pub fn ancestry(&self, id: &str) -> Vec<&LineageNode> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.node_index(id);

        while let Some(idx) = current {
            if !visited.insert(idx) {
                break;
            }
            chain.push(&self.nodes[idx.index()]);
            current = self.parent_index(idx);
        }

        chain
    }

    /// Nodes with no recorded base.
    pub fn roots(&self) -> Vec<&LineageNode> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.nodes[idx.index()])
            .collect()
    }

    /// The underlying DiGraph; node index `i` is `nodes()[i]`.
    pub(crate) fn digraph(&self) -> &DiGraph<(), ()> {
        &self.graph
    }

    fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index
            .get(&normalize(id, self.case_insensitive))
            .copied()
    }

    /// Oldest incoming edge, i.e. the first base recorded for `idx`.
    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Incoming).last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, base: Option<&str>) -> DistroRecord {
        let record = DistroRecord::new(name).with_description(format!("{} description", name));
        match base {
            Some(base) => record.derived_from(base),
            None => record,
        }
    }

    fn ids(graph: &LineageGraph) -> Vec<&str> {
        graph.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    fn edge_pairs(graph: &LineageGraph) -> Vec<(&str, &str)> {
        graph
            .edges()
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect()
    }

    #[test]
    fn test_base_and_child_both_real() {
        let graph = build(&[record("Debian", None), record("Ubuntu", Some("Debian"))]).unwrap();

        assert_eq!(ids(&graph), vec!["Debian", "Ubuntu"]);
        assert!(graph.nodes().iter().all(|n| !n.is_synthetic));
        assert_eq!(edge_pairs(&graph), vec![("Debian", "Ubuntu")]);
    }

    #[test]
    fn test_missing_base_becomes_synthetic() {
        let graph = build(&[record("Mint", Some("Ubuntu"))]).unwrap();

        assert_eq!(ids(&graph), vec!["Mint", "Ubuntu"]);
        let ubuntu = graph.node("Ubuntu").unwrap();
        assert!(ubuntu.is_synthetic);
        assert_eq!(ubuntu.label, "Ubuntu");
        assert!(ubuntu.record.is_none());
        assert_eq!(edge_pairs(&graph), vec![("Ubuntu", "Mint")]);
    }

    #[test]
    fn test_shared_missing_base_fans_out() {
        let graph = build(&[
            record("Ubuntu", Some("Debian")),
            record("MX Linux", Some("Debian")),
        ])
        .unwrap();

        let debian: Vec<_> = graph.nodes().iter().filter(|n| n.id == "Debian").collect();
        assert_eq!(debian.len(), 1);
        assert!(debian[0].is_synthetic);
        assert_eq!(
            edge_pairs(&graph),
            vec![("Debian", "Ubuntu"), ("Debian", "MX Linux")]
        );
        assert_eq!(graph.report().synthetic_nodes, 1);
    }

    #[test]
    fn test_self_reference_terminates() {
        let graph = build(&[record("X", Some("X"))]).unwrap();

        assert_eq!(ids(&graph), vec!["X"]);
        assert!(!graph.node("X").unwrap().is_synthetic);
        assert_eq!(edge_pairs(&graph), vec![("X", "X")]);
        assert_eq!(graph.report().self_loops, 1);
        assert_eq!(graph.ancestry("X").len(), 1);
    }

    #[test]
    fn test_blank_name_fails_with_index() {
        let err = build(&[
            record("Debian", None),
            record("Ubuntu", Some("Debian")),
            DistroRecord::new("   ").derived_from("Ubuntu"),
        ])
        .unwrap_err();

        assert!(matches!(err, LineageError::MalformedRecord { index: 2, .. }));
    }

    #[test]
    fn test_synthetic_upgraded_in_place() {
        let graph = build(&[
            record("Mint", Some("Ubuntu")),
            record("Ubuntu", Some("Debian")),
            record("Debian", None),
        ])
        .unwrap();

        assert_eq!(ids(&graph), vec!["Mint", "Ubuntu", "Debian"]);
        for node in graph.nodes() {
            assert!(!node.is_synthetic, "{} should be real", node.id);
            assert_eq!(node.label, format!("{} description", node.id));
        }
        assert_eq!(graph.report().upgraded, 2);
        assert_eq!(graph.report().synthetic_nodes, 0);
    }

    #[test]
    fn test_duplicate_record_keeps_first_metadata() {
        let graph = build(&[
            DistroRecord::new("Fedora").with_description("first"),
            DistroRecord::new("Fedora")
                .with_description("second")
                .derived_from("Red Hat"),
        ])
        .unwrap();

        assert_eq!(graph.node("Fedora").unwrap().label, "first");
        assert_eq!(graph.report().duplicate_records, 1);
        assert_eq!(edge_pairs(&graph), vec![("Red Hat", "Fedora")]);
    }

    #[test]
    fn test_duplicate_edges_are_skipped() {
        let graph = build(&[
            record("Ubuntu", Some("Debian")),
            record("Ubuntu", Some("Debian")),
        ])
        .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.report().duplicate_edges, 1);
    }

    #[test]
    fn test_case_insensitive_merges_spellings() {
        let records = [
            record("Xubuntu", Some("ubuntu")),
            record("Ubuntu", Some("DEBIAN")),
            record("Kubuntu", Some("Ubuntu")),
        ];

        let strict = build(&records).unwrap();
        assert_eq!(strict.node_count(), 5);

        let options = BuildOptions::default().case_insensitive();
        let folded = build_with(&records, &options).unwrap();
        assert_eq!(ids(&folded), vec!["Xubuntu", "Ubuntu", "DEBIAN", "Kubuntu"]);
        assert_eq!(
            edge_pairs(&folded),
            vec![
                ("Ubuntu", "Xubuntu"),
                ("DEBIAN", "Ubuntu"),
                ("Ubuntu", "Kubuntu")
            ]
        );
        assert!(folded.node("debian").unwrap().is_synthetic);
    }

    #[test]
    fn test_whitespace_in_references_is_ignored() {
        let graph = build(&[
            record("Debian ", None),
            record("Ubuntu", Some("  Debian")),
        ])
        .unwrap();

        assert_eq!(ids(&graph), vec!["Debian", "Ubuntu"]);
        assert_eq!(edge_pairs(&graph), vec![("Debian", "Ubuntu")]);
    }

    #[test]
    fn test_reject_policy_fails_on_cycle() {
        let records = [record("A", Some("B")), record("B", Some("A"))];
        let options = BuildOptions::default().with_cycle_policy(CyclePolicy::Reject);

        match build_with(&records, &options) {
            Err(LineageError::CycleDetected { cycles }) => {
                assert_eq!(cycles, vec![vec!["A".to_string(), "B".to_string()]]);
            }
            other => panic!("expected CycleDetected, got {:?}", other),
        }

        assert!(build(&records).is_ok());
    }

    #[test]
    fn test_queries() {
        let graph = build(&[
            record("Debian", None),
            record("Ubuntu", Some("Debian")),
            record("Mint", Some("Ubuntu")),
            record("Kubuntu", Some("Ubuntu")),
            record("Arch Linux", None),
        ])
        .unwrap();

        assert_eq!(graph.parent("Mint").unwrap().id, "Ubuntu");
        assert!(graph.parent("Debian").is_none());

        let children: Vec<_> = graph.children("Ubuntu").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["Mint", "Kubuntu"]);

        let chain: Vec<_> = graph.ancestry("Mint").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(chain, vec!["Mint", "Ubuntu", "Debian"]);

        let roots: Vec<_> = graph.roots().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["Debian", "Arch Linux"]);

        assert!(graph.ancestry("Gentoo").is_empty());
        assert!(!graph.contains("Gentoo"));
    }

    #[test]
    fn test_parent_is_first_recorded_base() {
        let graph = build(&[
            record("Fedora", Some("Red Hat")),
            record("Fedora", Some("Mandriva")),
        ])
        .unwrap();

        assert_eq!(graph.parent("Fedora").unwrap().id, "Red Hat");
        assert_eq!(graph.children("Mandriva")[0].id, "Fedora");

        let roots: Vec<_> = graph.roots().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["Red Hat", "Mandriva"]);
    }

    #[test]
    fn test_children_keep_link_order_at_scale() {
        let mut records = vec![record("Debian", None)];
        records.extend((0..50).map(|i| record(&format!("child-{}", i), Some("Debian"))));
        let graph = build(&records).unwrap();

        let children: Vec<String> = graph.children("Debian").iter().map(|n| n.id.clone()).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("child-{}", i)).collect();
        assert_eq!(children, expected);
    }

    #[test]
    fn test_cycle_policy_from_str() {
        assert_eq!("Reject".parse::<CyclePolicy>(), Ok(CyclePolicy::Reject));
        assert_eq!("accept".parse::<CyclePolicy>(), Ok(CyclePolicy::Accept));
        assert!("ignore".parse::<CyclePolicy>().is_err());
    }
}
