//! JSON format exporter.
//!
//! The minimum shape any renderer needs:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "Debian", "label": "...", "isSynthetic": false }],
//!   "edges": [{ "from": "Debian", "to": "Ubuntu" }],
//!   "metadata": { "nodeCount": 2, "edgeCount": 1, ... }
//! }
//! ```

use serde::Serialize;

use super::ExportConfig;
use crate::error::{LineageError, Result};
use crate::lineage::{BuildReport, LineageEdge, LineageGraph};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode<'a> {
    id: &'a str,
    label: &'a str,
    is_synthetic: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMetadata<'a> {
    node_count: usize,
    edge_count: usize,
    report: &'a BuildReport,
    generated_by: &'static str,
}

#[derive(Serialize)]
struct JsonGraph<'a> {
    nodes: Vec<JsonNode<'a>>,
    edges: &'a [LineageEdge],
    metadata: JsonMetadata<'a>,
}

/// Export a graph to its JSON node/edge description.
pub fn export(graph: &LineageGraph, config: &ExportConfig) -> Result<String> {
    let doc = JsonGraph {
        nodes: graph
            .nodes()
            .iter()
            .map(|n| JsonNode {
                id: &n.id,
                label: &n.label,
                is_synthetic: n.is_synthetic,
            })
            .collect(),
        edges: graph.edges(),
        metadata: JsonMetadata {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            report: graph.report(),
            generated_by: "lineage export",
        },
    };

    if config.pretty_print {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    }
    .map_err(LineageError::Encode)
}
