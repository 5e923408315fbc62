//! Export command - Multi-format graph export
//!
//! Exports the lineage graph to renderer-ready formats:
//! - json: nodes/edges plus build metadata
//! - mermaid: Mermaid flowchart syntax
//! - cytoscape: Cytoscape.js elements JSON
//! - adjacency: plain-text adjacency list
//!
//! Without `--output` the exported text goes to stdout as-is so it can be
//! piped; with it, a short summary is printed instead.

use anyhow::{Context, Result};
use colored::Colorize;
use lineage_core::{export, ExportConfig, ExportFormat};
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::Session;
use crate::output::{paint, OutputConfig, Outputter};

/// Export result
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub format: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub output_path: String,
    pub bytes: usize,
}

impl Outputter for ExportResult {
    fn to_table(&self, config: &OutputConfig) -> String {
        format!(
            "{} Exported {} nodes, {} edges as {} to {} ({} bytes)",
            paint("SUCCESS:", config, |s| s.green().bold()),
            self.node_count,
            self.edge_count,
            self.format,
            self.output_path,
            self.bytes
        )
    }
}

/// Run the export command
pub fn run(
    session: &Session,
    export_format: &str,
    output_path: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let format: ExportFormat = export_format.parse().map_err(anyhow::Error::msg)?;

    let graph = session.load_graph()?;

    let config = ExportConfig {
        pretty_print: !compact,
    };
    let content = export(&graph, format, &config)
        .with_context(|| format!("Failed to export graph as {}", format.as_str()))?;

    match output_path {
        Some(path) => {
            fs::write(path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!("Wrote {} export to {:?}", format.as_str(), path);

            let result = ExportResult {
                format: format.as_str().to_string(),
                node_count: graph.node_count(),
                edge_count: graph.edge_count(),
                output_path: path.display().to_string(),
                bytes: content.len(),
            };
            let mut output = session.output.clone();
            if compact {
                output = output.compact();
            }
            result.output(&output);
        }
        None => {
            if content.ends_with('\n') {
                print!("{}", content);
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}
