//! Lineage command - show where a distribution comes from
//!
//! Walks the derived-from chain of one distribution up to its root and lists
//! the distributions derived directly from it.

use anyhow::{bail, Result};
use colored::Colorize;
use lineage_core::{LineageGraph, LineageNode};
use serde::Serialize;

use super::Session;
use crate::output::{paint, OutputConfig, Outputter, TreeOutput};

/// A node on the chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub id: String,
    pub label: String,
    pub is_synthetic: bool,
}

impl From<&LineageNode> for ChainLink {
    fn from(node: &LineageNode) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            is_synthetic: node.is_synthetic,
        }
    }
}

/// Result of `lineage lineage <NAME>`.
#[derive(Debug, Serialize)]
pub struct LineageChain {
    /// Canonical spelling of the requested distribution.
    pub name: String,
    /// Oldest ancestor first, the requested distribution last.
    pub chain: Vec<ChainLink>,
    /// Distributions derived directly from `name`.
    pub derivatives: Vec<String>,
    /// The chain loops back on itself instead of reaching a root.
    pub cyclic: bool,
    #[serde(skip)]
    nodes: Vec<LineageNode>,
}

impl LineageChain {
    /// Resolve `name` in `graph`, or `None` when it is not there.
    pub fn resolve(graph: &LineageGraph, name: &str) -> Option<Self> {
        let node = graph.node(name)?;
        let ancestry = graph.ancestry(&node.id);

        let cyclic = ancestry
            .last()
            .and_then(|oldest| graph.parent(&oldest.id))
            .is_some();

        let nodes: Vec<LineageNode> = ancestry.into_iter().rev().cloned().collect();

        Some(Self {
            name: node.id.clone(),
            chain: nodes.iter().map(ChainLink::from).collect(),
            derivatives: graph
                .children(&node.id)
                .into_iter()
                .map(|child| child.id.clone())
                .collect(),
            cyclic,
            nodes,
        })
    }
}

impl Outputter for LineageChain {
    fn to_table(&self, config: &OutputConfig) -> String {
        let path: Vec<String> = self
            .chain
            .iter()
            .map(|link| {
                if link.is_synthetic {
                    format!("{}?", link.id)
                } else {
                    link.id.clone()
                }
            })
            .collect();

        let mut output = format!(
            "{} {}",
            paint("Lineage:", config, |s| s.cyan().bold()),
            path.join(" -> ")
        );

        if self.cyclic {
            output.push_str(&format!(
                "\n{} chain loops back on itself",
                paint("CYCLE:", config, |s| s.yellow().bold())
            ));
        }

        let derivatives = if self.derivatives.is_empty() {
            "(none)".to_string()
        } else {
            self.derivatives.join(", ")
        };
        output.push_str(&format!(
            "\n{} {}",
            paint("Derivatives:", config, |s| s.cyan().bold()),
            derivatives
        ));

        output
    }

    fn to_tree(&self, config: &OutputConfig) -> String {
        let nodes: Vec<&LineageNode> = self.nodes.iter().collect();
        TreeOutput::chain(&nodes, config)
    }
}

/// Run the lineage command
pub fn run(session: &Session, name: &str) -> Result<()> {
    let graph = session.load_graph()?;

    let Some(chain) = LineageChain::resolve(&graph, name) else {
        bail!(
            "Distribution '{}' not found in {}",
            name,
            session.catalog.display()
        );
    };

    chain.output(&session.output);
    Ok(())
}
