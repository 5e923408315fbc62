//! Cytoscape.js JSON exporter.

use serde::Serialize;

use super::ExportConfig;
use crate::error::{LineageError, Result};
use crate::lineage::LineageGraph;

#[derive(Serialize)]
struct CytoscapeGraph<'a> {
    elements: CytoscapeElements<'a>,
}

#[derive(Serialize)]
struct CytoscapeElements<'a> {
    nodes: Vec<CytoscapeNode<'a>>,
    edges: Vec<CytoscapeEdge<'a>>,
}

#[derive(Serialize)]
struct CytoscapeNode<'a> {
    data: CytoscapeNodeData<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classes: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CytoscapeNodeData<'a> {
    id: &'a str,
    label: &'a str,
    tooltip: &'a str,
    is_synthetic: bool,
}

#[derive(Serialize)]
struct CytoscapeEdge<'a> {
    data: CytoscapeEdgeData<'a>,
}

#[derive(Serialize)]
struct CytoscapeEdgeData<'a> {
    id: String,
    source: &'a str,
    target: &'a str,
}

/// Export to Cytoscape.js `elements` format
pub fn export(graph: &LineageGraph, config: &ExportConfig) -> Result<String> {
    let nodes = graph
        .nodes()
        .iter()
        .map(|n| CytoscapeNode {
            data: CytoscapeNodeData {
                id: &n.id,
                label: &n.id,
                tooltip: &n.label,
                is_synthetic: n.is_synthetic,
            },
            classes: n.is_synthetic.then_some("synthetic"),
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .enumerate()
        .map(|(i, e)| CytoscapeEdge {
            data: CytoscapeEdgeData {
                id: format!("e{}", i),
                source: &e.from,
                target: &e.to,
            },
        })
        .collect();

    let doc = CytoscapeGraph {
        elements: CytoscapeElements { nodes, edges },
    };

    if config.pretty_print {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    }
    .map_err(LineageError::Encode)
}
