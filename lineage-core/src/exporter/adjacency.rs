//! Plain adjacency-list exporter.
//!
//! One line per node, in graph order:
//!
//! ```text
//! Debian -> Ubuntu, MX Linux
//! Ubuntu -> Linux Mint
//! Linux Mint
//! ```
//!
//! Synthetic nodes are suffixed with `?`.

use crate::lineage::LineageGraph;

pub fn export(graph: &LineageGraph) -> String {
    let mut output = String::new();

    for node in graph.nodes() {
        output.push_str(&node.id);
        if node.is_synthetic {
            output.push('?');
        }

        let children = graph.children(&node.id);
        if !children.is_empty() {
            let names: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
            output.push_str(" -> ");
            output.push_str(&names.join(", "));
        }
        output.push('\n');
    }

    output
}
