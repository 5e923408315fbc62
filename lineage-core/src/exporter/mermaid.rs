//! Mermaid flowchart exporter.

use std::collections::HashMap;

use crate::lineage::LineageGraph;

/// Mermaid breaks on raw double quotes inside labels.
fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
}

/// Export to Mermaid diagram format
pub fn export(graph: &LineageGraph) -> String {
    let mut output = String::new();

    output.push_str("flowchart TD\n");
    output.push_str("    %% Distribution lineage\n\n");

    // Mermaid needs clean IDs
    let id_map: HashMap<&str, String> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), format!("n{}", i)))
        .collect();

    output.push_str("    %% Nodes\n");
    for node in graph.nodes() {
        let clean_id = &id_map[node.id.as_str()];
        if node.is_synthetic {
            output.push_str(&format!("    {}([\"{}\"])\n", clean_id, escape(&node.id)));
        } else {
            output.push_str(&format!("    {}[\"{}\"]\n", clean_id, escape(&node.id)));
        }
    }

    output.push('\n');
    output.push_str("    %% Edges\n");
    for edge in graph.edges() {
        if let (Some(source_id), Some(target_id)) =
            (id_map.get(edge.from.as_str()), id_map.get(edge.to.as_str()))
        {
            output.push_str(&format!("    {} --> {}\n", source_id, target_id));
        }
    }

    let synthetic: Vec<&str> = graph
        .nodes()
        .iter()
        .filter(|n| n.is_synthetic)
        .map(|n| id_map[n.id.as_str()].as_str())
        .collect();
    if !synthetic.is_empty() {
        output.push('\n');
        output.push_str("    classDef synthetic stroke-dasharray: 5 5\n");
        output.push_str(&format!("    class {} synthetic\n", synthetic.join(",")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::build;
    use crate::types::DistroRecord;

    #[test]
    fn test_export_mermaid() {
        let graph = build(&[
            DistroRecord::new("Ubuntu").derived_from("Debian"),
            DistroRecord::new("Linux Mint").derived_from("Ubuntu"),
        ])
        .unwrap();

        let output = export(&graph);

        assert!(output.starts_with("flowchart TD\n"));
        assert!(output.contains("n0[\"Ubuntu\"]"));
        assert!(output.contains("n1([\"Debian\"])"));
        assert!(output.contains("n2[\"Linux Mint\"]"));
        assert!(output.contains("n1 --> n0"));
        assert!(output.contains("n0 --> n2"));
        assert!(output.contains("class n1 synthetic"));
    }

    #[test]
    fn test_quotes_are_escaped() {
        let graph = build(&[DistroRecord::new("Say \"hi\" OS")]).unwrap();
        let output = export(&graph);
        assert!(output.contains("Say #quot;hi#quot; OS"));
        assert!(!output.contains("classDef"));
    }
}
