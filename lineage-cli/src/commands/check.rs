//! Check command - validate a catalog
//!
//! Loads and builds the catalog and reports anything worth a second look:
//! bases that have no record of their own, duplicate records and derivation
//! cycles. Hard failures (missing file, malformed record, a cycle under the
//! reject policy) surface as errors and a non-zero exit.

use anyhow::Result;
use colored::Colorize;
use lineage_core::{find_cycles, CyclePolicy, LineageGraph};
use serde::Serialize;

use super::{display_path, Session};
use crate::output::{paint, OutputConfig, Outputter, TableOutput};

/// Result of `lineage check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub catalog: String,
    pub records: usize,
    pub nodes: usize,
    pub edges: usize,
    /// Bases referenced by some record but never defined.
    pub missing_bases: Vec<String>,
    pub duplicate_records: usize,
    pub self_loops: usize,
    pub cycles: Vec<Vec<String>>,
    pub cycle_policy: CyclePolicy,
}

impl CheckReport {
    pub fn new(catalog: String, graph: &LineageGraph, cycle_policy: CyclePolicy) -> Self {
        let report = graph.report();
        Self {
            catalog,
            records: report.records,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            missing_bases: graph
                .nodes()
                .iter()
                .filter(|node| node.is_synthetic)
                .map(|node| node.id.clone())
                .collect(),
            duplicate_records: report.duplicate_records,
            self_loops: report.self_loops,
            cycles: find_cycles(graph),
            cycle_policy,
        }
    }

    /// Number of findings that deserve a warning.
    pub fn warning_count(&self) -> usize {
        self.missing_bases.len() + self.cycles.len() + usize::from(self.duplicate_records > 0)
    }
}

impl Outputter for CheckReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        let pairs = [
            ("Catalog", self.catalog.clone()),
            ("Records", self.records.to_string()),
            ("Nodes", self.nodes.to_string()),
            ("Edges", self.edges.to_string()),
        ];
        output.push_str(&TableOutput::format_key_value(&pairs, config));
        output.push('\n');

        for base in &self.missing_bases {
            output.push_str(&format!(
                "\n{} '{}' is referenced as a base but has no record",
                paint("WARNING:", config, |s| s.yellow().bold()),
                base
            ));
        }

        if self.duplicate_records > 0 {
            output.push_str(&format!(
                "\n{} {} duplicate record(s) ignored; the first record of each name wins",
                paint("WARNING:", config, |s| s.yellow().bold()),
                self.duplicate_records
            ));
        }

        for cycle in &self.cycles {
            output.push_str(&format!(
                "\n{} derivation cycle {}",
                paint("WARNING:", config, |s| s.yellow().bold()),
                cycle.join(" -> ")
            ));
        }

        let warnings = self.warning_count();
        if warnings == 0 {
            output.push_str(&format!(
                "\n{} catalog is consistent",
                paint("OK:", config, |s| s.green().bold())
            ));
        } else {
            output.push_str(&format!(
                "\n\n{} catalog builds with {} warning(s)",
                paint("OK:", config, |s| s.green().bold()),
                warnings
            ));
        }

        output
    }
}

/// Run the check command
pub fn run(session: &Session) -> Result<()> {
    let graph = session.load_graph()?;
    let report = CheckReport::new(
        display_path(&session.catalog),
        &graph,
        session.options.cycle_policy,
    );

    tracing::debug!(
        "{} warning(s) in {}",
        report.warning_count(),
        report.catalog
    );

    report.output(&session.output);
    Ok(())
}
