//! Command implementations for the lineage CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod check;
pub mod export;
pub mod graph;
pub mod lineage;

use anyhow::{Context, Result};
use lineage_core::{BuildOptions, DistroRecord, LineageGraph};
use std::path::{Path, PathBuf};

use crate::output::OutputConfig;

/// Settings shared by every command, resolved once from flags and config.
#[derive(Debug, Clone)]
pub struct Session {
    /// Catalog file to read.
    pub catalog: PathBuf,
    /// Options handed to the builder.
    pub options: BuildOptions,
    /// How results are rendered.
    pub output: OutputConfig,
}

impl Session {
    pub fn new(catalog: PathBuf, options: BuildOptions, output: OutputConfig) -> Self {
        Self {
            catalog,
            options,
            output,
        }
    }

    /// Load and validate the catalog.
    fn load_records(&self) -> Result<Vec<DistroRecord>> {
        lineage_core::load_records(&self.catalog)
            .with_context(|| format!("Failed to load catalog {}", self.catalog.display()))
    }

    /// Load the catalog and build its lineage graph.
    pub fn load_graph(&self) -> Result<LineageGraph> {
        let records = self.load_records()?;
        lineage_core::build_with(&records, &self.options)
            .with_context(|| format!("Failed to build lineage graph from {}", self.catalog.display()))
    }
}

/// Display form of a catalog path for command results.
pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
