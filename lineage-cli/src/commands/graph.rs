//! Graph command - build the lineage graph and print it
//!
//! Table output lists every node with its base plus the build report, JSON
//! output carries nodes, edges and report, and tree output draws the
//! derivation forest.

use anyhow::Result;
use colored::Colorize;
use lineage_core::{find_cycles, BuildReport, LineageEdge, LineageGraph};
use serde::Serialize;

use super::{display_path, Session};
use crate::output::{paint, OutputConfig, Outputter, TableOutput, TreeOutput};

/// One row of the node listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: String,
    pub label: String,
    pub is_synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

/// Result of `lineage graph`.
#[derive(Debug, Serialize)]
pub struct GraphSummary {
    pub catalog: String,
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<LineageEdge>,
    pub report: BuildReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<Vec<String>>,
    #[serde(skip)]
    graph: LineageGraph,
}

impl GraphSummary {
    pub fn new(catalog: String, graph: LineageGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeSummary {
                id: node.id.clone(),
                label: node.label.clone(),
                is_synthetic: node.is_synthetic,
                derived_from: graph.parent(&node.id).map(|p| p.id.clone()),
            })
            .collect();

        Self {
            catalog,
            nodes,
            edges: graph.edges().to_vec(),
            report: graph.report().clone(),
            cycles: find_cycles(&graph),
            graph,
        }
    }
}

impl Outputter for GraphSummary {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n\n",
            paint("Catalog:", config, |s| s.cyan().bold()),
            self.catalog
        ));

        let rows: Vec<Vec<String>> = self
            .nodes
            .iter()
            .map(|node| {
                vec![
                    node.id.clone(),
                    node.derived_from.clone().unwrap_or_else(|| "-".to_string()),
                    if node.is_synthetic { "yes" } else { "no" }.to_string(),
                    node.label.clone(),
                ]
            })
            .collect();
        output.push_str(&TableOutput::from_rows(
            &["Distribution", "Derived from", "Synthetic", "Description"],
            &rows,
            config,
        ));
        output.push_str("\n\n");

        let report = &self.report;
        let pairs = [
            ("Records", report.records.to_string()),
            ("Nodes", self.nodes.len().to_string()),
            ("Synthetic", report.synthetic_nodes.to_string()),
            ("Upgraded", report.upgraded.to_string()),
            ("Edges", self.edges.len().to_string()),
            ("Duplicate records", report.duplicate_records.to_string()),
            ("Cycles", self.cycles.len().to_string()),
        ];
        output.push_str(&TableOutput::format_key_value(&pairs, config));

        for cycle in &self.cycles {
            output.push_str(&format!(
                "\n{} {}",
                paint("CYCLE:", config, |s| s.yellow().bold()),
                cycle.join(" -> ")
            ));
        }

        output
    }

    fn to_tree(&self, config: &OutputConfig) -> String {
        TreeOutput::forest(&self.graph, config)
    }
}

/// Run the graph command
pub fn run(session: &Session) -> Result<()> {
    let graph = session.load_graph()?;
    let summary = GraphSummary::new(display_path(&session.catalog), graph);
    summary.output(&session.output);
    Ok(())
}
