//! Lineage Core - derivation graph builder for Linux distribution catalogs.
//!
//! Takes a flat catalog of distribution records, each optionally naming the
//! distribution it derives from, and produces a deduplicated node/edge graph
//! ready to hand to any renderer.
//!
//! # Features
//!
//! - **Single-pass builder**: O(records), deterministic for a given input order
//! - **Missing bases**: referenced but undefined distributions become synthetic nodes
//! - **In-place upgrade**: a synthetic node is filled in when its record shows up later
//! - **Cycle policy**: accept-and-render or reject, with cycle listing either way
//! - **Memoization**: [`LineageCache`] rebuilds only when the input changes
//! - **Multiple export formats**: JSON, Mermaid, Cytoscape.js, adjacency list
//!
//! # Usage
//!
//! ```no_run
//! use lineage_core::{build, load_records};
//! use std::path::Path;
//!
//! let records = load_records(Path::new("distros.json"))?;
//! let graph = build(&records)?;
//! for edge in graph.edges() {
//!     println!("{} -> {}", edge.from, edge.to);
//! }
//! # Ok::<(), lineage_core::LineageError>(())
//! ```

pub mod cycles;
pub mod error;
pub mod exporter;
pub mod lineage;
pub mod loader;
pub mod memo;
pub mod types;

pub use cycles::find_cycles;
pub use error::{LineageError, Result};
pub use exporter::{export, ExportConfig, ExportFormat};
pub use lineage::{
    build, build_with, BuildOptions, BuildReport, CyclePolicy, LineageEdge, LineageGraph,
    LineageNode,
};
pub use loader::{load_records, parse_records};
pub use memo::{CacheStats, LineageCache};
pub use types::{validate_records, DistroRecord, RawRecord};

/// Validate wire records and build their graph in one step.
///
/// A record without a name fails with [`LineageError::MalformedRecord`]
/// carrying its index.
pub fn build_from_raw(raw: Vec<RawRecord>, options: &BuildOptions) -> Result<LineageGraph> {
    let records = validate_records(raw)?;
    build_with(&records, options)
}

/// Get the version of lineage-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
