//! Renderer-facing exports of a finished lineage graph.
//!
//! Every format here is a straight serialization of the node and edge sets;
//! none of them adds graph logic, so any renderer can consume the output
//! directly.

pub mod adjacency;
pub mod cytoscape;
pub mod json;
pub mod mermaid;

use std::str::FromStr;

use crate::error::Result;
use crate::lineage::LineageGraph;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Mermaid,
    Cytoscape,
    Adjacency,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Json,
        ExportFormat::Mermaid,
        ExportFormat::Cytoscape,
        ExportFormat::Adjacency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Mermaid => "mermaid",
            Self::Cytoscape => "cytoscape",
            Self::Adjacency => "adjacency",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "mermaid" => Ok(Self::Mermaid),
            "cytoscape" => Ok(Self::Cytoscape),
            "adjacency" | "adj" => Ok(Self::Adjacency),
            _ => Err(format!(
                "Unknown export format: {}. Valid formats: json, mermaid, cytoscape, adjacency",
                s
            )),
        }
    }
}

/// Export settings shared by all formats.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Pretty-print JSON based formats.
    pub pretty_print: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

/// Export `graph` in the given format.
pub fn export(graph: &LineageGraph, format: ExportFormat, config: &ExportConfig) -> Result<String> {
    match format {
        ExportFormat::Json => json::export(graph, config),
        ExportFormat::Mermaid => Ok(mermaid::export(graph)),
        ExportFormat::Cytoscape => cytoscape::export(graph, config),
        ExportFormat::Adjacency => Ok(adjacency::export(graph)),
    }
}
